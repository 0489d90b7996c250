//! Resource route expansion.
//!
//! A resource turns a `(path, controller)` pair into a fixed set of
//! conventionally named routes. `Resource::web` yields the CRUD set:
//!
//! | action  | methods  | path                 |
//! |---------|----------|----------------------|
//! | index   | GET      | `/{path}s`           |
//! | show    | GET      | `/{path}/{id}`       |
//! | create  | GET/POST | `/{path}`            |
//! | edit    | GET/POST | `/{path}/{id}/edit`  |
//! | delete  | DELETE   | `/{path}/{id}/delete`|
//! | restore | GET      | `/{path}/{id}/restore`|

use crate::routing::collection::RouteCollection;
use crate::routing::pattern::trim_slashes;
use crate::routing::route::DIGITAL;
use crate::routing::types::RouteResult;

const NO_CONSTRAINTS: [(&str, &str); 0] = [];

/// One route a resource will register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoute {
    pub methods: String,
    pub path: String,
    pub handler: String,
    pub name: String,
    pub constraints: Vec<(String, String)>,
}

/// A controller exposed under a path.
#[derive(Debug, Clone)]
pub struct Resource {
    path: String,
    controller: String,
    name: String,
    routes: Vec<ResourceRoute>,
}

impl Resource {
    /// An empty resource; add routes with [`Resource::add`].
    pub fn new(path: &str, controller: impl Into<String>) -> Self {
        let path = trim_slashes(path).to_string();
        Self {
            name: path.replace('/', "_"),
            path,
            controller: controller.into(),
            routes: Vec::new(),
        }
    }

    /// The standard CRUD resource.
    pub fn web(path: &str, controller: impl Into<String>) -> Self {
        let id = [("id", DIGITAL)];
        Self::new(path, controller)
            .add("GET", "index", "s", NO_CONSTRAINTS)
            .add("GET", "show", "/{id}", id)
            .add("GET|POST", "create", "", NO_CONSTRAINTS)
            .add("GET|POST", "edit", "/{id}/edit", id)
            .add("DELETE", "delete", "/{id}/delete", id)
            .add("GET", "restore", "/{id}/restore", id)
    }

    /// Add an action; `suffix` is appended to the resource path verbatim.
    pub fn add<I, K, V>(mut self, methods: &str, action: &str, suffix: &str, constraints: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.routes.push(ResourceRoute {
            methods: methods.to_string(),
            path: format!("/{}{}", self.path, suffix),
            handler: format!("{}@{}", self.controller, action),
            name: format!("{}.{}", self.name, action),
            constraints: constraints
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn routes(&self) -> &[ResourceRoute] {
        &self.routes
    }

    /// Register every route of the resource on `collection`.
    pub fn map_routes(&self, collection: &mut RouteCollection) -> RouteResult<()> {
        for entry in &self.routes {
            collection
                .map(
                    entry.methods.as_str(),
                    &entry.path,
                    entry.handler.as_str(),
                    Some(entry.name.as_str()),
                )?
                .where_params(entry.constraints.iter().map(|(k, v)| (k, v)))?;
        }
        tracing::debug!(
            path = %self.path,
            controller = %self.controller,
            routes = self.routes.len(),
            "Resource mapped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_resource_layout() {
        let resource = Resource::web("/post/", "PostController");
        let routes = resource.routes();
        assert_eq!(routes.len(), 6);

        assert_eq!(routes[0].path, "/posts");
        assert_eq!(routes[0].name, "post.index");
        assert_eq!(routes[1].path, "/post/{id}");
        assert_eq!(routes[1].handler, "PostController@show");
        assert_eq!(routes[1].constraints, vec![("id".to_string(), r"\d+".to_string())]);
        assert_eq!(routes[2].methods, "GET|POST");
        assert_eq!(routes[2].path, "/post");
        assert!(routes[2].constraints.is_empty());
        assert_eq!(routes[4].methods, "DELETE");
        assert_eq!(routes[5].name, "post.restore");
    }

    #[test]
    fn test_nested_path_name() {
        let resource = Resource::web("blog/post", "PostController");
        assert_eq!(resource.routes()[0].name, "blog_post.index");
    }
}
