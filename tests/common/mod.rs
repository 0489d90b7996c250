//! Shared fixtures for integration tests.

#![allow(dead_code)]

use route_table::routing::{GroupOptions, Handler, Router};

pub const BASE_URL: &str = "http://localhost";

/// Options of the admin area group.
pub fn admin_options() -> GroupOptions {
    GroupOptions::new()
        .prefix("admin/")
        .namespace("Admin\\")
        .name("admin.")
        .middleware("App\\Middleware\\Authenticated")
}

/// A small application: a welcome page, a public user page and an admin
/// group managing users.
pub fn app_router() -> Router {
    let mut router = Router::new(BASE_URL);
    router.patterns([("name", ".*"), ("id", "[0-9]+"), ("slug", "[a-z\\-0-9]+")]);

    router
        .get("/", Handler::direct(|_| "Welcome!".to_string()), Some("welcome"))
        .unwrap();
    router
        .get("/user/{id}", "UserController@show", Some("user.show"))
        .unwrap();

    router
        .group(admin_options(), |routes| {
            routes.get("/users", "UserController@list", Some("user.list"))?;
            routes.get("/user/{id}", "UserController@show", Some("user.show"))?;
            routes.post("/user", "UserController@create", Some("user.create"))?;
            routes
                .put("/user/{id}", "UserController@edit", Some("user.edit"))?
                .middleware("App\\Middleware\\GuardMiddleware");
            routes.delete("/user/{id}", "UserController@delete", Some("user.delete"))?;
            Ok(())
        })
        .unwrap();

    router
        .get("/search/{name}", "SearchController@index", Some("search"))
        .unwrap();
    router
}

/// TOML equivalent of the admin part of [`app_router`].
pub const ADMIN_TOML: &str = r#"
base_url = "http://localhost/"
controller_namespace = "App\\Controller"

[patterns]
id = "[0-9]+"

[[routes]]
methods = "GET"
path = "/"
handler = "SiteController@index"
name = "home"

[[groups]]
prefix = "admin/"
namespace = "Admin\\"
name = "admin."
middleware = ["Authenticated"]

[[groups.routes]]
methods = "GET"
path = "/users"
handler = "UserController@list"
name = "user.list"

[[groups.routes]]
methods = ["PUT", "PATCH"]
path = "/user/{id}"
handler = "UserController@edit"
name = "user.edit"
middleware = ["Guard"]

[[groups.groups]]
prefix = "reports"
name = "reports."

[[groups.groups.routes]]
methods = "GET"
path = "/{year}"
handler = "ReportController@year"
name = "year"
where = { year = "[0-9]{4}" }

[[resources]]
path = "post"
controller = "PostController"
"#;
