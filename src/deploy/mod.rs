// ABOUTME: ECS rollouts: service updates and task definition image upgrades.
// ABOUTME: Each operation mutates desired state, then optionally polls for convergence.

mod rollout;
mod service;
mod task_images;

pub use rollout::{RolloutPolicy, describe_single_service, wait_for_steady_state};
pub use service::{ServiceTarget, ServiceUpdate, update_service};
pub use task_images::{
    ImageChange, RevisionChange, TaskImageUpdate, matches_filters, rewrite_images,
    update_task_images,
};
