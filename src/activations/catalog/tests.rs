//! Catalog service tests against a temporary SQLite database
//!
//! Covers the forest lifecycle end to end: whole-tree writes, nested node
//! edits, scoped product queries and category binding on items.

use super::*;
use crate::types::CatalogId;
use serde_json::json;
use tempfile::{tempdir, TempDir};

async fn create_test_service() -> (CatalogService, TempDir) {
    let dir = tempdir().unwrap();
    let config = CatalogStorageConfig {
        db_path: dir.path().join("test_catalog.db"),
    };
    let storage = CatalogStorage::new(config).await.unwrap();
    (CatalogService::new(storage), dir)
}

fn tree_input(name: &str, subcategories: Vec<NodeInput>) -> CategoryInput {
    CategoryInput {
        name: Some(name.to_string()),
        image_url: None,
        subcategories: Some(subcategories),
    }
}

fn item_input(name: &str, category_id: CatalogId) -> ItemInput {
    ItemInput {
        barcode: Some(format!("BC-{}", name)),
        name: Some(name.to_string()),
        category_id: Some(category_id.to_string()),
        price: Some(json!(10)),
        ..Default::default()
    }
}

/// Ids of `Main -> [Sub -> [SubSub]]`
struct MainTree {
    c1: CatalogId,
    s1: CatalogId,
    ss1: CatalogId,
}

async fn create_main_tree(service: &CatalogService) -> MainTree {
    let main = service
        .create_category(tree_input(
            "Main",
            vec![NodeInput::named("Sub").with_children(vec![NodeInput::named("SubSub")])],
        ))
        .await
        .unwrap();

    MainTree {
        c1: main.id,
        s1: main.subcategories[0].id,
        ss1: main.subcategories[0].subcategories[0].id,
    }
}

fn product_names(scope: &ProductScope) -> Vec<&str> {
    scope.products.iter().map(|p| p.name.as_str()).collect()
}

// ============================================================================
// Category documents
// ============================================================================

#[tokio::test]
async fn test_create_category_assigns_every_identifier() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let stored = service.get_category(tree.c1).await.unwrap();
    assert_eq!(stored.name, "Main");
    assert_eq!(stored.subcategories[0].id, tree.s1);
    assert_eq!(stored.subcategories[0].subcategories[0].id, tree.ss1);
    assert_ne!(tree.s1, tree.ss1);
}

#[tokio::test]
async fn test_resave_with_same_payload_keeps_identifiers() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    let stored = service.get_category(tree.c1).await.unwrap();

    let payload = CategoryInput {
        name: Some("Main (renamed)".into()),
        image_url: None,
        subcategories: Some(stored.subcategories.iter().map(NodeInput::from).collect()),
    };
    let updated = service.update_category(tree.c1, payload).await.unwrap();

    assert_eq!(updated.name, "Main (renamed)");
    assert_eq!(updated.subcategories, stored.subcategories);
    assert_eq!(updated.created_at, stored.created_at);
}

#[tokio::test]
async fn test_create_category_keeps_object_id_nodes() {
    let (service, _dir) = create_test_service().await;

    let input: CategoryInput = serde_json::from_value(json!({
        "name": "Main",
        "subcategories": [
            { "_id": "64f1a2b3c4d5e6f708192a3b", "name": "Sub", "imageUrl": "" }
        ]
    }))
    .unwrap();
    let saved = service.create_category(input).await.unwrap();

    let sub = &saved.subcategories[0];
    assert_eq!(sub.id.to_string(), "64f1a2b3c4d5e6f708192a3b");
    assert_eq!(sub.image_url, None);

    let item = service.create_item(item_input("X", sub.id)).await.unwrap();
    assert_eq!(item.subcategory, "Sub");
    let scope = service.resolve_products(saved.id, true).await.unwrap();
    assert_eq!(product_names(&scope), vec!["X"]);
}

#[tokio::test]
async fn test_update_with_malformed_id_persists_nothing() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    let before = service.get_category(tree.c1).await.unwrap();

    let payload = tree_input(
        "Broken",
        vec![NodeInput {
            id: Some("not-an-id".into()),
            ..NodeInput::named("X")
        }],
    );
    let err = service.update_category(tree.c1, payload).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidIdentifier(_)));

    assert_eq!(service.get_category(tree.c1).await.unwrap(), before);
}

#[tokio::test]
async fn test_identifier_reuse_across_roots_rejected() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let payload = tree_input(
        "Other",
        vec![NodeInput {
            id: Some(tree.s1.to_string()),
            ..NodeInput::named("Stolen")
        }],
    );
    let err = service.create_category(payload).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidIdentifier(ref m) if m.contains("Main")));
    assert_eq!(service.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_requires_names() {
    let (service, _dir) = create_test_service().await;

    let err = service
        .create_category(CategoryInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    let err = service
        .create_category(tree_input("Main", vec![NodeInput::named(" ")]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_categories_listed_in_insertion_order() {
    let (service, _dir) = create_test_service().await;
    for name in ["Zeta", "Alpha", "Mid"] {
        service.create_category(tree_input(name, vec![])).await.unwrap();
    }
    let first = service.list_categories().await.unwrap()[0].id;
    service
        .update_category(first, tree_input("Zeta 2", vec![]))
        .await
        .unwrap();

    let names: Vec<_> = service
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Zeta 2", "Alpha", "Mid"]);
}

#[tokio::test]
async fn test_delete_root_removes_every_descendant_from_lookup() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    service.create_category(tree_input("Keep", vec![])).await.unwrap();

    service.delete_category(tree.c1).await.unwrap();

    let forest = service.list_categories().await.unwrap();
    for id in [tree.c1, tree.s1, tree.ss1] {
        assert!(find_node_by_id(&forest, &id).is_none());
    }
    assert_eq!(forest.len(), 1);

    assert!(matches!(
        service.delete_category(tree.c1).await,
        Err(CatalogError::CategoryNotFound(_))
    ));
}

// ============================================================================
// Nested subcategory edits
// ============================================================================

#[tokio::test]
async fn test_add_subcategory_under_nested_parent() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let saved = service
        .add_subcategory(
            tree.c1,
            SubcategoryInput {
                parent_id: Some(tree.s1.to_string()),
                name: "Leaf".into(),
                image_url: None,
            },
        )
        .await
        .unwrap();

    let leaf = &saved.subcategories[0].subcategories[1];
    assert_eq!(leaf.name, "Leaf");

    let forest = service.list_categories().await.unwrap();
    let found = find_root_and_path(&forest, &leaf.id).unwrap();
    assert_eq!(found.root.id, tree.c1);
    assert_eq!(found.path[0].id, tree.s1);
    assert_eq!(found.target().id(), leaf.id);
}

#[tokio::test]
async fn test_add_subcategory_unknown_parent() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let err = service
        .add_subcategory(
            tree.c1,
            SubcategoryInput {
                parent_id: Some(CatalogId::new().to_string()),
                name: "Leaf".into(),
                image_url: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ParentNotFound(_)));
}

#[tokio::test]
async fn test_update_subcategory_keeps_identifier() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let saved = service
        .update_subcategory(
            tree.c1,
            tree.ss1,
            NodePatch {
                name: Some("Renamed".into()),
                image_url: Some("https://cdn.example/ss.png".into()),
                subcategories: None,
            },
        )
        .await
        .unwrap();

    let node = &saved.subcategories[0].subcategories[0];
    assert_eq!(node.id, tree.ss1);
    assert_eq!(node.name, "Renamed");
    assert_eq!(node.image_url.as_deref(), Some("https://cdn.example/ss.png"));
}

#[tokio::test]
async fn test_remove_subcategory_leaves_orphaned_item() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    let x = service.create_item(item_input("X", tree.ss1)).await.unwrap();

    service.remove_subcategory(tree.c1, tree.s1).await.unwrap();

    let forest = service.list_categories().await.unwrap();
    assert!(find_node_by_id(&forest, &tree.s1).is_none());
    assert!(find_node_by_id(&forest, &tree.ss1).is_none());

    // The item is neither deleted nor rebound; it still points at SS1
    let orphan = service.get_item(x.id).await.unwrap();
    assert_eq!(orphan.category_id, tree.ss1);
    assert_eq!(orphan.subcategory, "SubSub");

    // and no longer shows up under its former root
    let scope = service.resolve_products(tree.c1, true).await.unwrap();
    assert!(scope.products.is_empty());
}

// ============================================================================
// Scoped product queries
// ============================================================================

#[tokio::test]
async fn test_resolve_products_descendant_scenario() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    service.create_item(item_input("X", tree.ss1)).await.unwrap();

    let with = service.resolve_products(tree.c1, true).await.unwrap();
    assert_eq!(product_names(&with), vec!["X"]);
    assert_eq!(with.scope_ids, vec![tree.c1, tree.s1, tree.ss1]);

    let without = service.resolve_products(tree.c1, false).await.unwrap();
    assert!(without.products.is_empty());
    assert_eq!(without.scope_ids, vec![tree.c1]);

    let from_sub = service.resolve_products(tree.s1, true).await.unwrap();
    assert_eq!(product_names(&from_sub), vec!["X"]);
    assert_eq!(from_sub.category.id, tree.c1);
    assert_eq!(from_sub.subcategory.as_ref().map(|s| s.id), Some(tree.s1));
}

#[tokio::test]
async fn test_resolve_products_exact_scope_matches_either_reference() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    service.create_item(item_input("Direct", tree.s1)).await.unwrap();
    let mut legacy = item_input("Legacy", tree.c1);
    legacy.subcategory_id = Some(tree.s1.to_string());
    service.create_item(legacy).await.unwrap();
    service.create_item(item_input("Deeper", tree.ss1)).await.unwrap();

    let exact = service.resolve_products(tree.s1, false).await.unwrap();
    assert_eq!(product_names(&exact), vec!["Direct", "Legacy"]);
    for product in &exact.products {
        assert!(product.category_id == tree.s1 || product.subcategory_id == Some(tree.s1));
    }

    let wide = service.resolve_products(tree.s1, true).await.unwrap();
    assert_eq!(product_names(&wide), vec!["Deeper", "Direct", "Legacy"]);
    assert_eq!(wide.total_products, 3);
}

#[tokio::test]
async fn test_resolve_products_unknown_node() {
    let (service, _dir) = create_test_service().await;
    create_main_tree(&service).await;

    assert!(matches!(
        service.resolve_products(CatalogId::new(), true).await,
        Err(CatalogError::CategoryNotFound(_))
    ));
}

#[tokio::test]
async fn test_legacy_products_route_semantics() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    service.create_item(item_input("X", tree.ss1)).await.unwrap();

    let root_only = service.legacy_products(tree.c1, None).await.unwrap();
    assert!(root_only.products.is_empty());

    let via_sub = service.legacy_products(tree.c1, Some(tree.s1)).await.unwrap();
    assert_eq!(product_names(&via_sub), vec!["X"]);
}

#[tokio::test]
async fn test_category_hierarchy_counts() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    service.create_item(item_input("OnRoot", tree.c1)).await.unwrap();
    service.create_item(item_input("Deep", tree.ss1)).await.unwrap();
    let mut legacy = item_input("Legacy", tree.c1);
    legacy.subcategory_id = Some(tree.s1.to_string());
    service.create_item(legacy).await.unwrap();

    let report = service.category_hierarchy(tree.c1).await.unwrap();
    assert_eq!(report.scope_ids.len(), 3);
    assert_eq!(report.subcategories_count, 1);
    assert_eq!(report.in_category, 2);
    assert_eq!(report.in_subcategories, 1);
    assert_eq!(report.total, 3);
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_item_binding_ignores_intermediate_names() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let on_root = service.create_item(item_input("A", tree.c1)).await.unwrap();
    assert_eq!(on_root.category, "Main");
    assert_eq!(on_root.subcategory, "");

    let on_sub = service.create_item(item_input("B", tree.s1)).await.unwrap();
    assert_eq!(on_sub.category, "Main");
    assert_eq!(on_sub.subcategory, "Sub");

    let deep = service.create_item(item_input("C", tree.ss1)).await.unwrap();
    assert_eq!(deep.category, "Main");
    assert_eq!(deep.subcategory, "SubSub");
}

#[tokio::test]
async fn test_item_update_recomputes_names_from_current_tree() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    let item = service.create_item(item_input("A", tree.s1)).await.unwrap();

    service
        .update_subcategory(
            tree.c1,
            tree.s1,
            NodePatch {
                name: Some("Sub v2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = service
        .update_item(
            item.id,
            ItemInput {
                category_id: Some(tree.s1.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.subcategory, "Sub v2");
    assert_eq!(updated.name, "A");
    assert_eq!(updated.barcode, item.barcode);
    assert_eq!(updated.price, json!(10));
    assert_eq!(updated.created_at, item.created_at);
}

#[tokio::test]
async fn test_item_write_with_unresolvable_category_fails() {
    let (service, _dir) = create_test_service().await;
    create_main_tree(&service).await;

    let err = service
        .create_item(item_input("Lost", CatalogId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    assert!(service.list_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_item_validation_precedes_storage() {
    let (service, _dir) = create_test_service().await;

    let err = service
        .create_item(ItemInput {
            name: Some("NoCategory".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_item_update_clears_legacy_subcategory_on_empty_string() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;

    let mut input = item_input("A", tree.c1);
    input.subcategory_id = Some(tree.s1.to_string());
    let item = service.create_item(input).await.unwrap();
    assert_eq!(item.subcategory_id, Some(tree.s1));

    // Omitted keeps the stored reference
    let kept = service
        .update_item(
            item.id,
            ItemInput {
                category_id: Some(tree.c1.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.subcategory_id, Some(tree.s1));

    let cleared = service
        .update_item(
            item.id,
            ItemInput {
                category_id: Some(tree.c1.to_string()),
                subcategory_id: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.subcategory_id, None);
    assert!(service.resolve_products(tree.s1, false).await.unwrap().products.is_empty());
}

#[tokio::test]
async fn test_stored_duplicate_ids_resolve_to_first_occurrence() {
    let dir = tempdir().unwrap();
    let storage = CatalogStorage::new(CatalogStorageConfig {
        db_path: dir.path().join("test_catalog.db"),
    })
    .await
    .unwrap();
    let service = CatalogService::new(storage.clone());

    // Written straight to storage, as data from before ids were checked
    let shared = Node {
        id: CatalogId::new(),
        name: "Shared".into(),
        image_url: None,
        subcategories: vec![],
    };
    for name in ["First", "Second"] {
        storage
            .save_category(&Category {
                id: CatalogId::new(),
                name: name.into(),
                image_url: None,
                subcategories: vec![shared.clone()],
                created_at: 0,
                updated_at: 0,
            })
            .await
            .unwrap();
    }

    let scope = service.resolve_products(shared.id, true).await.unwrap();
    assert_eq!(scope.category.name, "First");

    let item = service.create_item(item_input("X", shared.id)).await.unwrap();
    assert_eq!(item.category, "First");
}

#[tokio::test]
async fn test_item_delete() {
    let (service, _dir) = create_test_service().await;
    let tree = create_main_tree(&service).await;
    let item = service.create_item(item_input("A", tree.c1)).await.unwrap();

    service.delete_item(item.id).await.unwrap();
    assert!(matches!(
        service.get_item(item.id).await,
        Err(CatalogError::ItemNotFound(_))
    ));
    assert!(matches!(
        service.delete_item(item.id).await,
        Err(CatalogError::ItemNotFound(_))
    ));
}
