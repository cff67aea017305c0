pub mod task_patch;
pub mod task_service;

pub use task_patch::TaskPatch;
pub use task_service::TaskService;
