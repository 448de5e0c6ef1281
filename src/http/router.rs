use std::{
    collections::HashMap,
    fmt,
    sync::{PoisonError, RwLock},
};

/// Parameters captured from a request path, keyed by name without the sigil.
pub type PathParams = HashMap<String, String>;

/// Marks a registered path segment as a parameter, e.g. `:id`.
pub const PARAM_SIGIL: char = ':';

const ROOT: usize = 0;

/// The outcome of a successful lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch<H> {
    /// The handler registered for the method and path.
    pub handler: H,
    /// Values of the parameter segments, raw and case-preserved.
    pub params: PathParams,
}

/// One path segment of one method's tree.
struct Node<H> {
    segment: String,
    is_param: bool,
    children: Vec<usize>,
    handler: Option<H>,
}

impl<H> Node<H> {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            is_param: segment.starts_with(PARAM_SIGIL),
            children: Vec::new(),
            handler: None,
        }
    }

    fn param_name(&self) -> &str {
        &self.segment[PARAM_SIGIL.len_utf8()..]
    }
}

/// The radix tree of a single method, stored as an arena with the root at index 0.
struct Tree<H> {
    nodes: Vec<Node<H>>,
}

impl<H> Tree<H> {
    fn new() -> Self {
        Self {
            nodes: vec![Node::new("")],
        }
    }

    fn insert(&mut self, path: &str, handler: H) {
        let mut current = ROOT;
        for segment in segments(path) {
            current = self.find_or_create_child(current, segment);
        }
        self.nodes[current].handler = Some(handler);
    }

    fn find_or_create_child(&mut self, parent: usize, segment: &str) -> usize {
        if let Some(&child) = self.nodes[parent]
            .children
            .iter()
            .find(|&&child| self.nodes[child].segment == segment)
        {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(Node::new(segment));
        self.nodes[parent].children.push(child);
        child
    }

    /// Descends one level per segment, preferring a literal child over a parameter child.
    fn search(&self, path: &str) -> Option<(&H, PathParams)> {
        let mut params = PathParams::new();
        let mut current = ROOT;

        for segment in segments(path) {
            let children = &self.nodes[current].children;
            let literal = children.iter().copied().find(|&child| {
                let node = &self.nodes[child];
                !node.is_param && node.segment == segment
            });

            current = if let Some(child) = literal {
                child
            } else {
                let param = children
                    .iter()
                    .copied()
                    .find(|&child| self.nodes[child].is_param)?;
                params.insert(
                    self.nodes[param].param_name().to_string(),
                    segment.to_string(),
                );
                param
            };
        }

        self.nodes[current]
            .handler
            .as_ref()
            .map(|handler| (handler, params))
    }

    fn collect_paths(&self, index: usize, prefix: &str, paths: &mut Vec<String>) {
        let node = &self.nodes[index];
        let path = if index == ROOT {
            String::new()
        } else {
            format!("{prefix}/{}", node.segment)
        };

        if node.handler.is_some() {
            paths.push(if path.is_empty() { "/".to_string() } else { path.clone() });
        }
        for &child in &node.children {
            self.collect_paths(child, &path, paths);
        }
    }
}

/// Non-empty segments of a path, so `/a/`, `/a` and `a` are all the same single segment.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Maps a method and a path to a handler, capturing parameter segments on the way.
///
/// Each method has its own tree. All trees sit behind one reader/writer lock, so
/// routes can be registered while other tasks resolve.
pub struct Router<H> {
    trees: RwLock<HashMap<String, Tree<H>>>,
}

impl<H: Clone> Router<H> {
    /// Returns a router without any routes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trees: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler for a method and path.
    ///
    /// Segments starting with `:` capture whatever the request has at that position.
    /// Registering the same method and path again replaces the previous handler.
    ///
    /// # Examples
    /// ```
    /// let router = radix_http::http::router::Router::new();
    /// router.register("GET", "/users/:id", "show user");
    ///
    /// let found = router.resolve("GET", "/users/42").unwrap();
    /// assert_eq!(found.handler, "show user");
    /// assert_eq!(found.params["id"], "42");
    /// assert!(router.resolve("POST", "/users/42").is_none());
    /// ```
    pub fn register(&self, method: &str, path: &str, handler: H) {
        let mut trees = self.trees.write().unwrap_or_else(PoisonError::into_inner);
        trees
            .entry(method.to_string())
            .or_insert_with(Tree::new)
            .insert(path, handler);
    }

    /// Looks up the handler for a method and path.
    ///
    /// Returns `None` both when no route matches the path and when the path matches a
    /// route registered for other methods only.
    #[must_use]
    pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<H>> {
        let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
        let (handler, params) = trees.get(method)?.search(path)?;
        Some(RouteMatch {
            handler: handler.clone(),
            params,
        })
    }

    /// Lists every registered `(method, path)` pair, sorted.
    #[must_use]
    pub fn routes(&self) -> Vec<(String, String)> {
        let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
        let mut routes = Vec::new();
        for (method, tree) in trees.iter() {
            let mut paths = Vec::new();
            tree.collect_paths(ROOT, "", &mut paths);
            routes.extend(paths.into_iter().map(|path| (method.clone(), path)));
        }
        routes.sort();
        routes
    }
}

impl<H: Clone> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
        let mut methods: Vec<_> = trees.keys().collect();
        methods.sort();
        f.debug_struct("Router").field("methods", &methods).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use crate::http::router::Router;

    #[test]
    fn parameter_route_round_trip() {
        let router = Router::new();
        router.register("GET", "/users/:id", "h");

        let found = router.resolve("GET", "/users/42").unwrap();
        assert_eq!(found.handler, "h");
        assert_eq!(found.params.len(), 1);
        assert_eq!(found.params["id"], "42");

        assert!(router.resolve("GET", "/users/42/extra").is_none());
        assert!(router.resolve("POST", "/users/42").is_none());
        assert!(router.resolve("GET", "/users").is_none());
    }

    #[test]
    fn literal_is_preferred_over_parameter() {
        let router = Router::new();
        router.register("GET", "/users/me", "h1");
        router.register("GET", "/users/:id", "h2");

        let found = router.resolve("GET", "/users/me").unwrap();
        assert_eq!(found.handler, "h1");
        assert!(found.params.is_empty());

        let found = router.resolve("GET", "/users/you").unwrap();
        assert_eq!(found.handler, "h2");
        assert_eq!(found.params["id"], "you");
    }

    #[test]
    fn literal_preference_does_not_depend_on_registration_order() {
        let router = Router::new();
        router.register("GET", "/users/:id", "h2");
        router.register("GET", "/users/me", "h1");

        assert_eq!(router.resolve("GET", "/users/me").unwrap().handler, "h1");
        assert_eq!(router.resolve("GET", "/users/7").unwrap().handler, "h2");
    }

    #[test]
    fn matching_does_not_backtrack_into_parameter() {
        let router = Router::new();
        router.register("GET", "/users/me", "h1");
        router.register("GET", "/users/:id/posts", "h2");

        assert!(router.resolve("GET", "/users/me/posts").is_none());
        assert_eq!(
            router.resolve("GET", "/users/7/posts").unwrap().handler,
            "h2"
        );
    }

    #[test]
    fn root_route() {
        let router = Router::new();
        router.register("GET", "/", "root");

        assert_eq!(router.resolve("GET", "/").unwrap().handler, "root");
        assert_eq!(router.resolve("GET", "").unwrap().handler, "root");
        assert!(router.resolve("GET", "/other").is_none());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let router = Router::new();
        router.register("GET", "/a/", "a");

        assert_eq!(router.resolve("GET", "/a").unwrap().handler, "a");
        assert_eq!(router.resolve("GET", "/a/").unwrap().handler, "a");
        assert_eq!(router.resolve("GET", "//a//").unwrap().handler, "a");
    }

    #[test]
    fn last_registration_wins() {
        let router = Router::new();
        router.register("GET", "/a", "first");
        router.register("GET", "/a/", "second");

        assert_eq!(router.resolve("GET", "/a").unwrap().handler, "second");
        assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn methods_have_separate_trees() {
        let router = Router::new();
        router.register("GET", "/items", "list");
        router.register("POST", "/items", "create");

        assert_eq!(router.resolve("GET", "/items").unwrap().handler, "list");
        assert_eq!(router.resolve("POST", "/items").unwrap().handler, "create");
        assert!(router.resolve("get", "/items").is_none());
        assert!(router.resolve("DELETE", "/items").is_none());
    }

    #[test]
    fn intermediate_node_without_handler_is_not_found() {
        let router = Router::new();
        router.register("GET", "/a/b/c", "deep");

        assert!(router.resolve("GET", "/a/b").is_none());
        assert_eq!(router.resolve("GET", "/a/b/c").unwrap().handler, "deep");
    }

    #[test]
    fn multiple_parameters_are_captured_raw() {
        let router = Router::new();
        router.register("GET", "/orgs/:org/repos/:repo", "repo");

        let found = router.resolve("GET", "/orgs/RustLang/repos/hello%20world").unwrap();
        assert_eq!(found.params["org"], "RustLang");
        assert_eq!(found.params["repo"], "hello%20world");
    }

    #[test]
    fn first_parameter_child_wins() {
        let router = Router::new();
        router.register("GET", "/files/:name", "by-name");
        router.register("GET", "/files/:id/raw", "raw");

        let found = router.resolve("GET", "/files/readme").unwrap();
        assert_eq!(found.handler, "by-name");
        assert!(router.resolve("GET", "/files/readme/raw").is_none());
    }

    #[test]
    fn routes_lists_registered_paths() {
        let router = Router::new();
        router.register("GET", "/", "root");
        router.register("GET", "/users/:id", "user");
        router.register("POST", "/users", "create");

        assert_eq!(
            router.routes(),
            vec![
                ("GET".to_string(), "/".to_string()),
                ("GET".to_string(), "/users/:id".to_string()),
                ("POST".to_string(), "/users".to_string()),
            ]
        );
    }

    #[test]
    fn concurrent_register_and_resolve() {
        let router = Arc::new(Router::new());
        router.register("GET", "/health", 0_usize);

        thread::scope(|scope| {
            for writer in 1..=4_usize {
                let router = Arc::clone(&router);
                scope.spawn(move || {
                    for i in 0..100 {
                        router.register("GET", &format!("/w{writer}/{i}"), writer);
                    }
                });
            }
            for _ in 0..4 {
                let router = Arc::clone(&router);
                scope.spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(router.resolve("GET", "/health").unwrap().handler, 0);
                    }
                });
            }
        });

        assert_eq!(router.routes().len(), 401);
        assert_eq!(router.resolve("GET", "/w3/99").unwrap().handler, 3);
    }
}
