pub mod etl;
pub mod pipeline;
pub mod publish;
pub mod transform;

pub use crate::domain::model::{PriceRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
