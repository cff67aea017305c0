pub mod task;

pub use task::{NewTaskRequest, Task, TaskList, UpdateTaskRequest, timestamp_now};
