//! Search nodes and the arena that owns them.
//!
//! Every position the search driver creates lives in a [`ModelArena`].
//! Selectors only ever see [`Model`] values, which are cheap `Copy` handles
//! carrying the node's id, coordinates and accumulated path length. Parent
//! links are plain ids into the arena, so path reconstruction never needs
//! shared ownership.

use serde::{Deserialize, Serialize};

/// Identity of a model inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub usize);

/// A candidate search node: a grid position plus path metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Arena identity. Two models are "the same" iff their ids match.
    pub id: ModelId,

    /// Horizontal grid coordinate.
    pub x: i32,

    /// Vertical grid coordinate (the search moves towards larger `y`).
    pub y: i32,

    /// Predecessor in the search tree, `None` for the start node.
    pub parent: Option<ModelId>,

    /// Accumulated path cost from the start.
    pub length: f64,
}

impl Model {
    /// Returns true if both models sit on the same grid cell.
    pub fn same_position(&self, other: &Model) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Grid coordinates as a tuple.
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Owner of every model created during a search.
///
/// Ids are dense indices, handed out in creation order.
#[derive(Debug, Clone, Default)]
pub struct ModelArena {
    nodes: Vec<Model>,
}

impl ModelArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new model and returns a copy of it.
    pub fn spawn(&mut self, x: i32, y: i32, parent: Option<ModelId>, length: f64) -> Model {
        let model = Model {
            id: ModelId(self.nodes.len()),
            x,
            y,
            parent,
            length,
        };
        self.nodes.push(model);
        model
    }

    /// Looks up a model by id.
    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.nodes.get(id.0)
    }

    /// Number of models created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no model has been created yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reconstructs the path ending at `id`, root first.
    ///
    /// Returns an empty path for unknown ids.
    pub fn path(&self, id: ModelId) -> Vec<(i32, i32)> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let Some(model) = current {
            path.push(model.position());
            current = model.parent.and_then(|parent| self.get(parent));
        }
        path.reverse();
        path
    }

    /// Removes every model.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
