pub use crate::data_structs::arrays::ArrayType;
pub use crate::data_structs::products::{
    ProductKind,
    ProductStore,
};
pub use crate::data_structs::sample::{
    Sample,
    SampleBatch,
};
pub use crate::error::{
    PipelineError,
    Result,
};
pub use crate::io::export::ExportManager;
pub use crate::io::ingest::read_batch_dir;
pub use crate::pipeline::config::{
    Estimator,
    ExportFormat,
    ExportSelection,
    PipelineConfig,
    RunOptions,
};
pub use crate::pipeline::planner::ExecutionPlan;
pub use crate::pipeline::registry::StepKind;
pub use crate::pipeline::{
    make_pipeline,
    process_batch,
    run_pipeline,
};
