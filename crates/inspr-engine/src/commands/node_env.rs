//! Node environment resolution for the deployment converter.
//!
//! A node reaches its channels through environment variables injected next
//! to its own. The converter reads them from whichever tree it holds, a
//! committed snapshot or an open transaction.

use std::collections::BTreeMap;

use inspr_core::errors::{ExError, InsprError};
use inspr_core::model::App;
use inspr_core::TreeReader;
use inspr_core::{AppGetter, ChannelGetter, TypeGetter};
use serde::Serialize;

use crate::errors::Result;

pub const INPUT_CHANNELS: &str = "INSPR_INPUT_CHANNELS";
pub const OUTPUT_CHANNELS: &str = "INSPR_OUTPUT_CHANNELS";
pub const APP_ID: &str = "INSPR_APP_ID";

/// Environment of one node, keyed by variable name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeEnvironment {
    /// dApp path joined by `-`
    pub app_id: String,
    pub vars: BTreeMap<String, String>,
}

impl NodeEnvironment {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Build the environment of the node at `scope`
///
/// Starts from the node's declared environment, then sets:
/// - `INSPR_INPUT_CHANNELS` / `INSPR_OUTPUT_CHANNELS`: `<channel>_<broker>`
///   per boundary entry, joined by `;`
/// - `<entry>_RESOLVED = INSPR_<channel uuid>` per boundary entry
/// - `INSPR_<channel uuid>_SCHEMA` with the schema of the channel's type
/// - `INSPR_APP_ID`
///
/// # Errors
///
/// `NotANode` when the dApp has no node; lookup and boundary resolution
/// errors otherwise.
pub fn node_environment<R>(reader: &R, scope: &str) -> Result<NodeEnvironment>
where
    R: TreeReader + ?Sized,
{
    build(reader, scope).map_err(|e| ExError::from(e).with_op("node_environment"))
}

fn build<R>(reader: &R, scope: &str) -> inspr_core::Result<NodeEnvironment>
where
    R: TreeReader + ?Sized,
{
    let app = reader.get_app(scope)?;
    let node = app.node().ok_or_else(|| InsprError::NotANode {
        scope: scope.to_string(),
    })?;
    let resolved = reader.resolve_channels(app)?;

    let mut vars = node.spec.environment.clone();

    let channel_list = |entries: &[String]| -> inspr_core::Result<String> {
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            let r = resolved.get(entry).ok_or_else(|| InsprError::Internal {
                message: format!("boundary entry {} missing from resolution", entry),
            })?;
            let channel = reader.get_channel(&r.scope, &r.channel)?;
            out.push(format!("{}_{}", r.channel, channel.spec.selected_broker));
        }
        Ok(out.join(";"))
    };
    let inputs = channel_list(&app.spec.boundary.input)?;
    let outputs = channel_list(&app.spec.boundary.output)?;
    vars.insert(INPUT_CHANNELS.to_string(), inputs);
    vars.insert(OUTPUT_CHANNELS.to_string(), outputs);

    for (entry, r) in &resolved {
        let channel = reader.get_channel(&r.scope, &r.channel)?;
        let ty = reader.get_type(&r.scope, &channel.spec.type_name)?;
        let key = format!("INSPR_{}", channel.meta.uuid);
        vars.insert(format!("{}_SCHEMA", key), ty.schema.clone());
        vars.insert(format!("{}_RESOLVED", entry), key);
    }

    let app_id = app_id(app);
    vars.insert(APP_ID.to_string(), app_id.clone());

    tracing::debug!(
        scope,
        app_id = app_id.as_str(),
        boundaries = resolved.len(),
        "node environment resolved"
    );
    Ok(NodeEnvironment { app_id, vars })
}

fn app_id(app: &App) -> String {
    app.meta
        .parent
        .split('.')
        .filter(|part| !part.is_empty())
        .chain(std::iter::once(app.meta.name.as_str()))
        .collect::<Vec<_>>()
        .join("-")
}
