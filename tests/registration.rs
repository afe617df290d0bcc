//! Route synthesis from discovered modules.

use std::sync::Arc;

use module_router::lifecycle::register_modules;
use module_router::routing::{
    ControllerDescriptor, ControllerTable, HttpVerb, MethodDescriptor, ParamDescriptor,
    RegistrationOptions, RegistrationReport, Registrar, RouteTable, SkipReason, VerbSet,
};
use module_router::config::schema::RoutingConfig;

mod common;

use common::ModuleTree;

fn post_tree() -> ModuleTree {
    let tree = ModuleTree::new();
    tree.module(
        "Post",
        r#"
        modules = true
        modules-name = "post"
        modules-middleware = ["guest"]
        modules-type = "controller"
        modules-init = "inlite"
        "#,
    );
    tree
}

fn post_controllers() -> ControllerTable {
    let mut table = ControllerTable::new();
    table.insert(
        ControllerDescriptor::new("Modules/Post/Http/Controllers/Post")
            .method(MethodDescriptor::public("getShow").param(ParamDescriptor::new("id", Some("int")))),
    );
    table
}

fn register(tree: &ModuleTree, controllers: ControllerTable) -> (RouteTable, Vec<RegistrationReport>) {
    let discovery = tree.registry().discover();
    let registrar = Registrar::new(Arc::new(controllers), &RoutingConfig::default());
    let mut table = RouteTable::new();
    let reports = register_modules(
        &mut table,
        &discovery,
        &registrar,
        &RegistrationOptions::default(),
        "api",
    )
    .unwrap();
    (table, reports)
}

#[test]
fn test_post_show_end_to_end() {
    let (table, reports) = register(&post_tree(), post_controllers());

    assert_eq!(
        reports,
        vec![RegistrationReport::Registered {
            module: "post".into(),
            routes: 1
        }]
    );

    let route = &table.routes()[0];
    assert_eq!(route.verbs, VerbSet::single(HttpVerb::Get));
    assert_eq!(route.path, "post/show/{id}");
    assert_eq!(route.constraints.get("id"), Some(r"(\d+)"));
    assert_eq!(route.name.as_deref(), Some("getShow"));
    assert_eq!(route.full_name.as_deref(), Some("post.getShow"));
    assert_eq!(route.tag.as_deref(), Some("post.post"));
    assert_eq!(route.middleware, vec!["guest"]);
    assert_eq!(route.handler.controller, "Modules/Post/Http/Controllers/Post");
    assert_eq!(route.handler.method, "getShow");
}

#[test]
fn test_unresolved_controller_is_skipped() {
    let (table, reports) = register(&post_tree(), ControllerTable::new());

    assert!(table.is_empty());
    assert_eq!(
        reports,
        vec![RegistrationReport::Skipped {
            module: "post".into(),
            reason: SkipReason::ControllerNotFound
        }]
    );
}

#[test]
fn test_controller_namespace_follows_directory() {
    let tree = ModuleTree::new();
    tree.controller_module("BlogPosts", "blogposts");

    let mut controllers = ControllerTable::new();
    controllers.insert(
        ControllerDescriptor::new("Modules/BlogPosts/Http/Controllers/Blogposts")
            .method(MethodDescriptor::public("getList")),
    );
    let (table, reports) = register(&tree, controllers);

    assert_eq!(reports[0].route_count(), 1);
    assert_eq!(table.routes()[0].path, "blogposts/list");
    assert_eq!(
        table.routes()[0].handler.controller,
        "Modules/BlogPosts/Http/Controllers/Blogposts"
    );
}

#[test]
fn test_module_without_type_is_not_routed() {
    let tree = ModuleTree::new();
    tree.module(
        "Post",
        r#"
        modules = true
        modules-name = "post"
        modules-init = "inlite"
        "#,
    );

    let (table, reports) = register(&tree, post_controllers());

    assert!(table.is_empty());
    assert_eq!(
        reports,
        vec![RegistrationReport::Skipped {
            module: "post".into(),
            reason: SkipReason::NotController
        }]
    );
}

#[test]
fn test_manifest_drives_variant_routes() {
    let tree = post_tree();
    tree.module(
        "Api/Shop",
        r#"
        modules = true
        modules-name = "shop"
        modules-name-route = "store"
        modules-type = "controller"
        modules-init = "inlite/api"
        "#,
    );
    let manifest = tree.root_file(
        "controllers.manifest",
        r#"
        [types]
        entities = ["Product"]

        [[controller]]
        key = "Modules/Api/Shop/Http/Controllers/Shop"

        [[controller.method]]
        name = "index"

        [[controller.method]]
        name = "xgetProduct"
        params = [
            { name = "product", type = "Product" },
            { name = "request", type = "Request" },
            { name = "format", type = "string", optional = true },
        ]

        [[controller.method]]
        name = "voltOrder"
        params = [{ name = "uuid" }]
        "#,
    );

    let controllers = ControllerTable::from_manifest(&manifest).unwrap();
    let (table, reports) = register(&tree, controllers);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].route_count(), 3);

    let paths: Vec<&str> = table.routes().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "api/store",
            "api/store/product/{product}/{format?}",
            "api/store/order/{uuid}"
        ]
    );

    let product = &table.routes()[1];
    assert_eq!(product.verbs, VerbSet::single(HttpVerb::Get));
    assert_eq!(product.middleware, vec!["xhr"]);
    assert_eq!(product.full_name.as_deref(), Some("store.xgetProduct"));
    assert_eq!(product.tag.as_deref(), Some("shop.shop"));

    let order = &table.routes()[2];
    assert_eq!(order.verbs, VerbSet::get_head());
    assert!(order.constraints.get("uuid").unwrap().contains("[0-9a-f]{8}"));
}
