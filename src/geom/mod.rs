mod geometries;

pub use geometries::MunicipalityGeometries;
