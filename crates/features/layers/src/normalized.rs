use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vista_domain::catalog::{CatalogLayer, Protocol};

use crate::arcgis::{ArcGisOptions, map_arcgis};
use crate::context::MapContext;
use crate::data::{DataOptions, map_data};
use crate::error::{LayerError, LayerErrorExt};
use crate::vector::{VectorOptions, map_vector};
use crate::wms::{WmsOptions, map_wms};
use crate::wmts::{WmtsOptions, map_wmts};

/// Axis order declared for WMS 1.3.0 projections.
const NORTH_EAST_UP: &str = "neu";

/// The `{type, options}` layer document the map client consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum NormalizedLayer {
    Wms(Box<WmsOptions>),
    Wmts(Box<WmtsOptions>),
    ArcGis(Box<ArcGisOptions>),
    Vector(Box<VectorOptions>),
    Data(DataOptions),
}

impl NormalizedLayer {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Wms(o) => &o.id,
            Self::Wmts(o) => &o.id,
            Self::ArcGis(o) => &o.id,
            Self::Vector(o) => &o.id,
            Self::Data(o) => &o.id,
        }
    }
}

/// A projection as handed to the client: a bare code, or a code with axis orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectionRef {
    Code(String),
    #[serde(rename_all = "camelCase")]
    Oriented {
        code: String,
        axis_orientation: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        extent: Option<Vec<f64>>,
    },
}

impl ProjectionRef {
    #[must_use]
    pub fn oriented(code: String, extent: Option<Vec<f64>>) -> Self {
        Self::Oriented { code, axis_orientation: NORTH_EAST_UP.to_owned(), extent }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Code(code) | Self::Oriented { code, .. } => code,
        }
    }
}

/// Maps one catalog entry, picking the mapper from the entry's catalog section.
///
/// # Errors
/// [`LayerError::UnsupportedProtocol`] for sections no mapper handles, and
/// [`LayerError::Malformed`] when the entry does not fit its protocol's shape.
pub fn map_layer(
    layer: &CatalogLayer<'_>,
    ctx: &MapContext<'_>,
) -> Result<NormalizedLayer, LayerError> {
    let Some(protocol) = layer.protocol else {
        return Err(LayerError::UnsupportedProtocol {
            message: format!("catalog section '{}'", layer.section).into(),
            context: None,
        });
    };

    debug!(section = layer.section, %protocol, id = ?layer.id(), "Mapping catalog layer");

    Ok(match protocol {
        Protocol::Wms => NormalizedLayer::Wms(Box::new(map_wms(parse(layer)?, ctx))),
        Protocol::Wmts => NormalizedLayer::Wmts(Box::new(map_wmts(parse(layer)?, ctx))),
        Protocol::ArcGis => NormalizedLayer::ArcGis(Box::new(map_arcgis(parse(layer)?))),
        Protocol::Vector => NormalizedLayer::Vector(Box::new(map_vector(parse(layer)?))),
        Protocol::Data => NormalizedLayer::Data(map_data(parse(layer)?, ctx)),
    })
}

fn parse<T: DeserializeOwned>(layer: &CatalogLayer<'_>) -> Result<T, LayerError> {
    let id = layer.id().unwrap_or_default();
    serde_json::from_value(layer.to_value()).context(format!("{} layer '{id}'", layer.section))
}
