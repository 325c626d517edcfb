// ABOUTME: Validated domain types for DNS names, image tags, and task definitions.
// ABOUTME: Parsing happens once at the edge so operations work with checked values.

mod host_name;
mod image_ref;
mod task_definition;

pub use host_name::{HostName, HostNameError};
pub use image_ref::{ImageTag, ImageTagError, repository, retag};
pub use task_definition::{ParseTaskDefinitionRefError, TaskDefinitionRef, newest_revision};
