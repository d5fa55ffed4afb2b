use std::fmt;

/// Identifies a single unit (a municipality polygon) within a `Region`.
///
/// Units are assigned contiguous indices starting from `0`, in the order the
/// geometries were handed to `Region::new`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Position of this unit in the region's geometry vector.
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl From<usize> for UnitId {
    fn from(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "unit index {index} does not fit in u32");
        Self(index as u32)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}
