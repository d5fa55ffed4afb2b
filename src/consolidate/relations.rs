use ahash::AHashMap;

/// Trips between two municipalities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRecord {
    pub origin: u32,
    pub dest: u32,
    pub trips: f64,
}

/// Travel time between two municipalities, in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedanceRecord {
    pub origin: u32,
    pub dest: u32,
    pub hours: f64,
}

/// Functional relations between municipalities: the directed trip table and
/// the undirected travel-time (impedance) table.  Both are optional.
#[derive(Debug, Clone, Default)]
pub struct FunctionalRelations {
    flows: Option<AHashMap<(u32, u32), f64>>,
    totals: AHashMap<u32, f64>,
    impedance: AHashMap<(u32, u32), f64>,
}

impl FunctionalRelations {
    pub fn new() -> Self { Self::default() }

    /// Attach a trip table; repeated pairs accumulate.
    pub fn with_flows(mut self, records: impl IntoIterator<Item = FlowRecord>) -> Self {
        let mut flows = AHashMap::new();
        for r in records {
            if !r.trips.is_finite() || r.trips <= 0.0 { continue }
            *flows.entry((r.origin, r.dest)).or_insert(0.0) += r.trips;
            *self.totals.entry(r.origin).or_insert(0.0) += r.trips;
        }
        self.flows = Some(flows);
        self
    }

    /// Attach a travel-time table; for repeated pairs the shortest time wins.
    pub fn with_impedances(mut self, records: impl IntoIterator<Item = ImpedanceRecord>) -> Self {
        for r in records {
            if !r.hours.is_finite() || r.hours < 0.0 { continue }
            let slot = self.impedance.entry(pair(r.origin, r.dest)).or_insert(f64::INFINITY);
            *slot = slot.min(r.hours);
        }
        self
    }

    #[inline] pub fn has_flow_table(&self) -> bool { self.flows.is_some() }

    /// Total trips originating at `origin` (0 without a trip table).
    #[inline] pub fn total_flow(&self, origin: u32) -> f64 { self.totals.get(&origin).copied().unwrap_or(0.0) }

    pub fn flow(&self, origin: u32, dest: u32) -> f64 {
        self.flows.as_ref().and_then(|f| f.get(&(origin, dest)).copied()).unwrap_or(0.0)
    }

    #[inline] pub fn has_flow(&self, origin: u32, dest: u32) -> bool { self.flow(origin, dest) > 0.0 }

    /// Travel time between `a` and `b` in either direction.
    pub fn travel_time(&self, a: u32, b: u32) -> Option<f64> {
        self.impedance.get(&pair(a, b)).copied()
    }
}

#[inline]
fn pair(a: u32, b: u32) -> (u32, u32) { if a <= b { (a, b) } else { (b, a) } }
