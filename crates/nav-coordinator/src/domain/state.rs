//! Navigation state tree
//!
//! Recursive description of the nested navigation stacks the host
//! controller currently shows. The serialised shape follows the host
//! (`routes`, `index`, nested `state`).

use super::command::Params;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hard bound for walks over the active branch, independent of the
/// configurable validation depth. Malformed or cyclic persisted data can
/// never drive recursion past it.
pub const ACTIVE_BRANCH_LIMIT: usize = 64;

/// One route in a stack, optionally owning a nested stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(default, alias = "nested", skip_serializing_if = "Option::is_none")]
    pub state: Option<StateTree>,
}

impl StateNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
            state: None,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_state(mut self, state: StateTree) -> Self {
        self.state = Some(state);
        self
    }
}

/// A stack of routes and the index of the active one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTree {
    pub routes: Vec<StateNode>,
    #[serde(alias = "activeIndex")]
    pub index: usize,
}

impl StateTree {
    pub fn new(routes: Vec<StateNode>, index: usize) -> Self {
        Self { routes, index }
    }

    /// Single-route stack.
    pub fn single(node: StateNode) -> Self {
        Self {
            routes: vec![node],
            index: 0,
        }
    }

    /// Route at `index`, if the index is in bounds.
    pub fn active_route(&self) -> Option<&StateNode> {
        self.routes.get(self.index)
    }

    /// Innermost active route, reached by following `index` through nested
    /// state until a route has none.
    ///
    /// Returns `None` when any stack on the way is empty or its index is out
    /// of bounds, or the branch is deeper than [`ACTIVE_BRANCH_LIMIT`].
    pub fn active_leaf(&self) -> Option<&StateNode> {
        Self::find_leaf(self, 0)
    }

    fn find_leaf(tree: &StateTree, depth: usize) -> Option<&StateNode> {
        if depth > ACTIVE_BRANCH_LIMIT {
            return None;
        }
        let route = tree.active_route()?;
        match &route.state {
            Some(nested) => Self::find_leaf(nested, depth + 1),
            None => Some(route),
        }
    }

    /// Mutable counterpart of [`StateTree::active_leaf`].
    pub fn active_leaf_mut(&mut self) -> Option<&mut StateNode> {
        let mut tree = self;
        for _ in 0..=ACTIVE_BRANCH_LIMIT {
            let index = tree.index;
            let route = tree.routes.get_mut(index)?;
            if route.state.is_none() {
                return Some(route);
            }
            tree = route.state.as_mut()?;
        }
        None
    }
}

/// Presentation mode the session runs in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    Site,
    #[default]
    App,
}

impl NavigationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::App => "app",
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "site" => Ok(Self::Site),
            "app" => Ok(Self::App),
            other => Err(format!("unknown navigation mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn home_tree() -> StateTree {
        StateTree::new(
            vec![
                StateNode::leaf("LoginScreen"),
                StateNode::leaf("HomeStack").with_state(StateTree::new(
                    vec![
                        StateNode::leaf("HomeScreen"),
                        StateNode::leaf("SearchTab").with_state(StateTree::single(
                            StateNode::leaf("SearchScreen"),
                        )),
                    ],
                    1,
                )),
            ],
            1,
        )
    }

    #[test]
    fn test_active_leaf_follows_indices() {
        let tree = home_tree();
        assert_eq!(tree.active_leaf().map(|n| n.name.as_str()), Some("SearchScreen"));
    }

    #[test]
    fn test_active_leaf_out_of_bounds() {
        let tree = StateTree::new(vec![StateNode::leaf("X")], 5);
        assert!(tree.active_leaf().is_none());
    }

    #[test]
    fn test_active_leaf_mut_updates_leaf() {
        let mut tree = home_tree();
        let leaf = tree.active_leaf_mut().unwrap();
        leaf.params = Some(Params::new());
        assert!(tree.active_leaf().unwrap().params.is_some());
    }

    #[test]
    fn test_host_shape_and_aliases() {
        let tree: StateTree = serde_json::from_value(json!({
            "routes": [{ "name": "HomeStack", "nested": { "routes": [{ "name": "HomeScreen" }], "activeIndex": 0 } }],
            "activeIndex": 0
        }))
        .unwrap();
        assert_eq!(tree.active_leaf().unwrap().name, "HomeScreen");

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["routes"][0]["state"]["index"], json!(0));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("site".parse::<NavigationMode>().unwrap(), NavigationMode::Site);
        assert_eq!(" APP ".parse::<NavigationMode>().unwrap(), NavigationMode::App);
        assert!("desktop".parse::<NavigationMode>().is_err());
        assert_eq!(NavigationMode::Site.to_string(), "site");
    }
}
