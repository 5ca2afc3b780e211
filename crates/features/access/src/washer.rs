use crate::directory::DirectoryResolver;
use crate::error::DirectoryError;
use crate::filter::VisibilityFilter;
use crate::memo::MemoizedDirectory;
use std::future::Future;
use std::pin::Pin;
use tracing::{instrument, trace};
use vista_domain::document::{Group, LayerRef, MapConfiguration, Tool, ToolOptions};
use vista_domain::identity::Identity;

type WashFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Group>, DirectoryError>> + Send + 'a>>;

/// Prunes a map configuration down to what one identity may see.
///
/// The input is never modified; a new configuration is built. Tools, baselayers and layers
/// are filtered by their own `visibleForGroups`. Group nodes are always kept and only their
/// children are filtered, whatever the group's own `visibleForGroups` says.
#[derive(Debug)]
pub struct ConfigWasher<'a, D> {
    directory: &'a D,
}

impl<'a, D: DirectoryResolver> ConfigWasher<'a, D> {
    #[must_use]
    pub const fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// Washes `config` for `identity`. The identity is assumed to be valid already.
    ///
    /// Membership answers are memoized for the duration of this call only.
    ///
    /// # Errors
    /// The first [`DirectoryError`] aborts the whole wash; no partially washed tree is returned.
    #[instrument(skip_all, fields(identity = %identity))]
    pub async fn wash_configuration(
        &self,
        config: &MapConfiguration,
        identity: &Identity,
    ) -> Result<MapConfiguration, DirectoryError> {
        let memo = MemoizedDirectory::new(self.directory);
        let filter = VisibilityFilter::new(&memo);

        trace!("Washing map configuration");

        let mut tools = Vec::with_capacity(config.tools.len());
        for tool in &config.tools {
            let label = format!("plugin \"{}\"", tool.kind);
            if filter.is_visible(tool.visible_for_groups(), identity, &label).await? {
                tools.push(wash_tool(&filter, tool, identity).await?);
            }
        }

        Ok(MapConfiguration { map: config.map.clone(), tools, extra: config.extra.clone() })
    }
}

async fn wash_tool<D: DirectoryResolver>(
    filter: &VisibilityFilter<'_, D>,
    tool: &Tool,
    identity: &Identity,
) -> Result<Tool, DirectoryError> {
    let ToolOptions::LayerSwitcher(options) = &tool.options else {
        return Ok(tool.clone());
    };

    let baselayers = filter_layers(filter, &options.baselayers, identity, "baselayer").await?;
    let groups = wash_groups(filter, &options.groups, identity).await?;

    let mut options = options.clone_without_tree();
    options.baselayers = baselayers;
    options.groups = groups;

    Ok(Tool {
        kind: tool.kind.clone(),
        options: ToolOptions::LayerSwitcher(options),
        extra: tool.extra.clone(),
    })
}

async fn filter_layers<D: DirectoryResolver>(
    filter: &VisibilityFilter<'_, D>,
    layers: &[LayerRef],
    identity: &Identity,
    kind: &str,
) -> Result<Vec<LayerRef>, DirectoryError> {
    let mut kept = Vec::with_capacity(layers.len());
    for layer in layers {
        let label = format!("{kind} \"{}\"", layer.id);
        if filter.is_visible(&layer.visible_for_groups, identity, &label).await? {
            kept.push(layer.clone());
        }
    }
    Ok(kept)
}

/// Depth-first, pre-order: a group's layers are filtered before its subgroups are washed.
fn wash_groups<'a, D: DirectoryResolver + 'a>(
    filter: &'a VisibilityFilter<'_, D>,
    groups: &'a [Group],
    identity: &'a Identity,
) -> WashFuture<'a> {
    Box::pin(async move {
        let mut washed = Vec::with_capacity(groups.len());
        for group in groups {
            let layers = filter_layers(filter, &group.layers, identity, "layer").await?;
            let children = wash_groups(filter, &group.groups, identity).await?;

            washed.push(Group {
                id: group.id.clone(),
                name: group.name.clone(),
                visible_for_groups: group.visible_for_groups.clone(),
                layers,
                groups: children,
                extra: group.extra.clone(),
            });
        }
        Ok(washed)
    })
}
