//! Value types shared by the plate planner crates: well identifiers, well
//! selections and validated colors.

pub mod color;
pub mod well;

pub use color::{ColorError, PlateColor};
pub use well::{
    COLUMN_COUNT, ROW_COUNT, ROW_LETTERS, WELL_COUNT, WellId, WellIdError, parse_well_selection,
    well_range,
};
