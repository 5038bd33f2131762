//! Link-path resolution.
//!
//! Paths are absolute (`/93170-9/54635-8/86843-0`). Resolution walks from
//! the root, matching one segment per level against the children's local
//! codes. Forms are shallow and narrow, so a linear child scan per level is
//! all this needs.

use tracing::trace;

use crate::error::FormError;
use crate::form::Form;
use crate::node::NodeId;

impl Form {
    /// Find the node whose `linkId` is exactly `link_id`.
    pub fn resolve(&self, link_id: &str) -> Result<NodeId, FormError> {
        let not_found = || FormError::PathNotFound {
            path: link_id.to_string(),
            referrer: None,
        };

        let delimiter = self.config().path_delimiter;
        let rest = link_id.strip_prefix(delimiter).ok_or_else(not_found)?;

        let mut current = self.root();
        for segment in rest.split(delimiter) {
            current = self
                .children(current)
                .iter()
                .copied()
                .find(|&child| self.node(child).local_code() == segment)
                .ok_or_else(not_found)?;
        }

        trace!(link_id, node = %current, "resolved");
        Ok(current)
    }
}
