pub mod feature;
pub mod row;
pub mod space;
pub mod table;

pub use feature::{Feature, FeatureRange};
pub use row::{EntityFeatureRow, RawFeatureRow};
pub use space::{FeatureSpace, SpaceEntry};
pub use table::{DropReport, EntityFeatureTable};
