// ABOUTME: Registers new task definition revisions with rewritten image tags.
// ABOUTME: Only containers matching an image filter are retagged; the old revision is deregistered.

use crate::aws::{EcsOps, TaskDefinition};
use crate::error::{Error, Result};
use crate::output::Output;
use crate::types::{ImageTag, TaskDefinitionRef, newest_revision, retag};
use aws_sdk_ecs::types::ContainerDefinition;
use nonempty::NonEmpty;

/// Which families to update, which images inside them, and the new tag.
#[derive(Debug, Clone)]
pub struct TaskImageUpdate {
    pub tag: ImageTag,
    pub families: NonEmpty<String>,
    /// Substrings; a container is updated when its image contains any of them.
    pub image_filters: NonEmpty<String>,
}

/// One container image that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChange {
    pub container: Option<String>,
    pub from: String,
    pub to: String,
}

/// Result of updating one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionChange {
    pub family: String,
    pub previous: TaskDefinitionRef,
    pub previous_arn: String,
    pub registered_arn: String,
    pub images: Vec<ImageChange>,
}

/// Whether `image` is selected by any of the filters.
pub fn matches_filters<'a, I>(image: &str, filters: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    filters.into_iter().any(|filter| image.contains(filter.as_str()))
}

/// Retag every container whose image matches a filter.
///
/// Containers without an image or without a match pass through unchanged.
pub fn rewrite_images<'a, I>(
    containers: &mut [ContainerDefinition],
    filters: I,
    tag: &ImageTag,
    output: &Output,
) -> Vec<ImageChange>
where
    I: IntoIterator<Item = &'a String> + Clone,
{
    let mut changes = Vec::new();

    for container in containers.iter_mut() {
        let Some(previous) = container.image.as_deref() else {
            continue;
        };

        if !matches_filters(previous, filters.clone()) {
            output.progress(&format!("Not updating {previous}"));
            continue;
        }

        let updated = retag(previous, tag);
        output.progress(&format!("Upgrading image {previous} -> {updated}"));
        changes.push(ImageChange {
            container: container.name.clone(),
            from: previous.to_string(),
            to: updated.clone(),
        });
        container.image = Some(updated);
    }

    changes
}

/// Update every family in `request`, in order, stopping at the first error.
pub async fn update_task_images<E>(
    ecs: &E,
    request: &TaskImageUpdate,
    output: &Output,
) -> Result<Vec<RevisionChange>>
where
    E: EcsOps + ?Sized,
{
    output.progress(&format!(
        "Task definitions to update: {}",
        request.families.iter().cloned().collect::<Vec<_>>().join(", ")
    ));
    output.progress(&format!(
        "Container images to update: {}",
        request.image_filters.iter().cloned().collect::<Vec<_>>().join(", ")
    ));
    output.progress(&format!("Image tag to use: {}\n", request.tag));

    let mut results = Vec::with_capacity(request.families.len());
    for family in request.families.iter() {
        results.push(update_family(ecs, family, request, output).await?);
    }
    Ok(results)
}

async fn update_family<E>(
    ecs: &E,
    family: &str,
    request: &TaskImageUpdate,
    output: &Output,
) -> Result<RevisionChange>
where
    E: EcsOps + ?Sized,
{
    output.progress(&format!("Updating {family}"));

    let arns = ecs.list_task_definitions(family).await?;
    let (previous_arn, previous) =
        newest_revision(family, &arns).ok_or_else(|| Error::NoTaskDefinitions(family.to_string()))?;
    let previous_arn = previous_arn.to_string();
    output.progress(&format!("Previous definition {previous_arn}"));

    let TaskDefinition {
        container_definitions: mut containers,
        settings,
        ..
    } = ecs.describe_task_definition(&previous_arn).await?;

    let images = rewrite_images(&mut containers, &request.image_filters, &request.tag, output);
    if images.is_empty() {
        output.warning(&format!(
            "No container images in {family} matched; registering an identical revision"
        ));
    }

    let draft = TaskDefinition {
        family: family.to_string(),
        container_definitions: containers,
        settings,
    };
    let registered_arn = ecs.register_task_definition(&draft).await?;
    output.progress(&format!("New task definition: {registered_arn}"));

    output.progress(&format!("Deregistering {previous_arn}\n"));
    ecs.deregister_task_definition(&previous_arn).await?;

    Ok(RevisionChange {
        family: family.to_string(),
        previous,
        previous_arn,
        registered_arn,
        images,
    })
}
