//! Request-level catalog operations
//!
//! Every operation that touches the tree follows the same cycle: load the
//! forest (or one root), build the index, work in memory, then write whole
//! documents back. Nothing is cached between calls.

use super::index::ForestIndex;
use super::mutate::{insert_node, remove_node, update_node};
use super::resolve::{bind_item_category, CategoryBinding, CategoryRef};
use super::storage::{CatalogStorage, ItemFilter};
use super::tree::{
    check_unique_ids, collect_descendant_ids, ensure_identifiers, validate_names, NodeRef, TreeNode,
};
use super::types::{
    CatalogError, Category, CategoryInput, HierarchyReport, Item, ItemInput, NodeInput, NodePatch,
    ProductScope, SubcategoryInput,
};
use crate::types::{current_timestamp, CatalogId};

#[derive(Clone)]
pub struct CatalogService {
    storage: CatalogStorage,
}

impl CatalogService {
    pub fn new(storage: CatalogStorage) -> Self {
        Self { storage }
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.storage.find_all_categories().await
    }

    pub async fn get_category(&self, id: CatalogId) -> Result<Category, CatalogError> {
        self.load_root(id).await
    }

    /// Create a root from a whole-tree payload
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category, CatalogError> {
        let name = required_name(input.name.as_deref())?;
        let subcategories = ensure_identifiers(input.subcategories.as_deref().unwrap_or_default())?;

        let now = current_timestamp();
        let category = Category {
            id: CatalogId::new(),
            name,
            image_url: input.image_url.filter(|url| !url.is_empty()),
            subcategories,
            created_at: now,
            updated_at: now,
        };

        let saved = self.persist_root(category).await?;
        tracing::info!(category_id = %saved.id, name = %saved.name, "Category created");
        Ok(saved)
    }

    /// Apply a whole-tree update. A present `subcategories` array replaces
    /// the stored subtree; nodes keep their identity only if the payload
    /// carries their ids.
    pub async fn update_category(
        &self,
        id: CatalogId,
        input: CategoryInput,
    ) -> Result<Category, CatalogError> {
        tracing::debug!(category_id = %id, "Updating category");

        // Identifier problems surface before the root is even loaded
        let subcategories = input
            .subcategories
            .as_deref()
            .map(ensure_identifiers)
            .transpose()?;

        let mut category = self.load_root(id).await?;
        if let Some(name) = input.name.as_deref() {
            category.name = required_name(Some(name))?;
        }
        if let Some(url) = input.image_url {
            category.image_url = Some(url).filter(|url| !url.is_empty());
        }
        if let Some(subcategories) = subcategories {
            category.subcategories = subcategories;
        }
        category.updated_at = current_timestamp();

        let saved = self.persist_root(category).await?;
        tracing::info!(
            category_id = %saved.id,
            subcategories = saved.subcategories.len(),
            "Category updated"
        );
        Ok(saved)
    }

    /// Delete a root and its whole subtree. Items referencing any of those
    /// nodes are left untouched.
    pub async fn delete_category(&self, id: CatalogId) -> Result<(), CatalogError> {
        let category = self.load_root(id).await?;

        let mut scope = vec![category.id];
        scope.extend(collect_descendant_ids(&category));
        self.warn_orphans(&scope, "category deleted").await?;

        if !self.storage.delete_category_by_id(&id).await? {
            return Err(CatalogError::CategoryNotFound(id));
        }
        tracing::info!(category_id = %id, name = %category.name, "Category deleted");
        Ok(())
    }

    // ========================================================================
    // Nested subcategories
    // ========================================================================

    /// Insert a node under `parentId` (or the root when absent)
    pub async fn add_subcategory(
        &self,
        root_id: CatalogId,
        input: SubcategoryInput,
    ) -> Result<Category, CatalogError> {
        let parent_id = match input.parent_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(CatalogId::parse_str(raw)?),
            _ => None,
        };

        let mut category = self.load_root(root_id).await?;
        let node = NodeInput {
            id: None,
            name: input.name.trim().to_string(),
            image_url: input.image_url.filter(|url| !url.is_empty()),
            subcategories: Vec::new(),
        };
        let node_id = insert_node(&mut category, parent_id, &node)?;
        category.updated_at = current_timestamp();

        let saved = self.persist_root(category).await?;
        tracing::info!(
            category_id = %root_id,
            subcategory_id = %node_id,
            parent_id = ?parent_id,
            "Subcategory added"
        );
        Ok(saved)
    }

    pub async fn update_subcategory(
        &self,
        root_id: CatalogId,
        node_id: CatalogId,
        patch: NodePatch,
    ) -> Result<Category, CatalogError> {
        let mut category = self.load_root(root_id).await?;
        update_node(&mut category, node_id, &patch)?;
        category.updated_at = current_timestamp();

        let saved = self.persist_root(category).await?;
        tracing::info!(category_id = %root_id, subcategory_id = %node_id, "Subcategory updated");
        Ok(saved)
    }

    /// Remove a node and everything below it
    pub async fn remove_subcategory(
        &self,
        root_id: CatalogId,
        node_id: CatalogId,
    ) -> Result<Category, CatalogError> {
        let mut category = self.load_root(root_id).await?;
        let removed = remove_node(&mut category, node_id)?;
        category.updated_at = current_timestamp();

        let mut scope = vec![removed.id];
        scope.extend(collect_descendant_ids(&removed));
        self.warn_orphans(&scope, "subcategory removed").await?;

        let saved = self.storage.save_category(&category).await?;
        tracing::info!(
            category_id = %root_id,
            subcategory_id = %node_id,
            removed_nodes = scope.len(),
            "Subcategory removed"
        );
        Ok(saved)
    }

    // ========================================================================
    // Product queries
    // ========================================================================

    /// Products whose `categoryId` or `subcategoryId` is the node or, with
    /// `include_descendants`, any node below it. Ordered by name then id.
    pub async fn resolve_products(
        &self,
        node_id: CatalogId,
        include_descendants: bool,
    ) -> Result<ProductScope, CatalogError> {
        let forest = self.storage.find_all_categories().await?;
        let index = ForestIndex::build(&forest);
        warn_duplicate_ids(&index);

        let found = CategoryRef::resolve(&index, &node_id).map_err(|e| {
            tracing::warn!(node_id = %node_id, "Product query for unknown category");
            e
        })?;
        let scope_ids = found.scope(include_descendants);

        let products = self
            .storage
            .find_items(&ItemFilter::InScope(scope_ids.clone()))
            .await?;
        tracing::debug!(
            node_id = %node_id,
            include_descendants,
            scope = scope_ids.len(),
            products = products.len(),
            "Resolved products"
        );

        let category = NodeRef::Root(found.root()).summary();
        let subcategory = match found {
            CategoryRef::Root(_) => None,
            CategoryRef::Nested { .. } => Some(found.target().summary()),
        };

        Ok(ProductScope {
            category,
            subcategory,
            total_products: products.len(),
            scope_ids,
            products,
        })
    }

    /// Older product route: with a subcategory it covers that node and its
    /// descendants, without one only the category itself.
    pub async fn legacy_products(
        &self,
        category_id: CatalogId,
        subcategory_id: Option<CatalogId>,
    ) -> Result<ProductScope, CatalogError> {
        match subcategory_id {
            Some(sub) => self.resolve_products(sub, true).await,
            None => self.resolve_products(category_id, false).await,
        }
    }

    pub async fn category_hierarchy(&self, id: CatalogId) -> Result<HierarchyReport, CatalogError> {
        let forest = self.storage.find_all_categories().await?;
        let index = ForestIndex::build(&forest);
        warn_duplicate_ids(&index);

        let found = CategoryRef::resolve(&index, &id)?;
        let target = found.target();
        let scope_ids = found.scope(true);

        let in_category = self
            .storage
            .find_items(&ItemFilter::CategoryIdIn(vec![id]))
            .await?
            .len();
        let in_subcategories = self
            .storage
            .find_items(&ItemFilter::SubcategoryIdIn(scope_ids.clone()))
            .await?
            .len();
        let total = self
            .storage
            .find_items(&ItemFilter::InScope(scope_ids.clone()))
            .await?
            .len();

        Ok(HierarchyReport {
            subcategories_count: target.subcategories().len(),
            category: target.summary(),
            scope_ids,
            in_category,
            in_subcategories,
            total,
        })
    }

    // ========================================================================
    // Items
    // ========================================================================

    pub async fn list_items(&self) -> Result<Vec<Item>, CatalogError> {
        self.storage.find_all_items().await
    }

    pub async fn get_item(&self, id: CatalogId) -> Result<Item, CatalogError> {
        self.storage
            .find_item_by_id(&id)
            .await?
            .ok_or(CatalogError::ItemNotFound(id))
    }

    /// Create an item; category names are derived from `categoryId`
    pub async fn create_item(&self, input: ItemInput) -> Result<Item, CatalogError> {
        let refs = input.validate(true)?;
        let binding = self.bind(refs.category_id).await?;

        let now = current_timestamp();
        let item = Item {
            id: CatalogId::new(),
            barcode: trimmed(input.barcode).unwrap_or_default(),
            name: trimmed(input.name).unwrap_or_default(),
            description: input.description.filter(|d| !d.is_empty()),
            category: binding.category_name,
            category_id: binding.category_id,
            subcategory: binding.subcategory_name,
            subcategory_id: refs.subcategory_id,
            price: input.price.unwrap_or_default(),
            specs: input.specs.unwrap_or_default(),
            images: input.images.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let saved = self.storage.save_item(&item).await?;
        tracing::info!(item_id = %saved.id, category_id = %saved.category_id, "Item created");
        Ok(saved)
    }

    /// Update an item. Omitted fields keep their stored values, but the
    /// category names are always recomputed. An empty `subcategoryId` clears
    /// the legacy reference.
    pub async fn update_item(&self, id: CatalogId, input: ItemInput) -> Result<Item, CatalogError> {
        let refs = input.validate(false)?;
        let binding = self.bind(refs.category_id).await?;

        let mut item = self.get_item(id).await?;
        if let Some(barcode) = trimmed(input.barcode) {
            item.barcode = barcode;
        }
        if let Some(name) = trimmed(input.name) {
            item.name = name;
        }
        if let Some(description) = input.description {
            item.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(price) = input.price {
            item.price = price;
        }
        if let Some(specs) = input.specs {
            item.specs = specs;
        }
        if let Some(images) = input.images {
            item.images = images;
        }
        match input.subcategory_id.as_deref().map(str::trim) {
            Some("") => item.subcategory_id = None,
            Some(_) => item.subcategory_id = refs.subcategory_id,
            None => {}
        }
        item.category = binding.category_name;
        item.category_id = binding.category_id;
        item.subcategory = binding.subcategory_name;
        item.updated_at = current_timestamp();

        let saved = self.storage.save_item(&item).await?;
        tracing::info!(item_id = %saved.id, category_id = %saved.category_id, "Item updated");
        Ok(saved)
    }

    pub async fn delete_item(&self, id: CatalogId) -> Result<(), CatalogError> {
        if !self.storage.delete_item_by_id(&id).await? {
            return Err(CatalogError::ItemNotFound(id));
        }
        tracing::info!(item_id = %id, "Item deleted");
        Ok(())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    async fn load_root(&self, id: CatalogId) -> Result<Category, CatalogError> {
        self.storage.find_category_by_id(&id).await?.ok_or_else(|| {
            tracing::warn!(category_id = %id, "Category not found");
            CatalogError::CategoryNotFound(id)
        })
    }

    async fn bind(&self, category_id: CatalogId) -> Result<CategoryBinding, CatalogError> {
        let forest = self.storage.find_all_categories().await?;
        let index = ForestIndex::build(&forest);
        warn_duplicate_ids(&index);
        bind_item_category(&index, &category_id).map_err(|e| {
            tracing::warn!(category_id = %category_id, "Item references unknown category");
            e
        })
    }

    /// Check names and forest-wide identifier uniqueness, then write the
    /// whole root document
    async fn persist_root(&self, category: Category) -> Result<Category, CatalogError> {
        validate_names(&category.subcategories)?;

        let forest = self.storage.find_all_categories().await?;
        check_unique_ids(&category, &forest)?;

        self.storage.save_category(&category).await
    }

    async fn warn_orphans(&self, scope: &[CatalogId], reason: &str) -> Result<(), CatalogError> {
        let orphaned = self
            .storage
            .find_items(&ItemFilter::InScope(scope.to_vec()))
            .await?
            .len();
        if orphaned > 0 {
            tracing::warn!(orphaned, reason, "Items still reference removed categories");
        }
        Ok(())
    }
}

fn warn_duplicate_ids(index: &ForestIndex<'_>) {
    if !index.duplicates().is_empty() {
        tracing::warn!(
            duplicates = ?index.duplicates(),
            "Category forest repeats identifiers; lookups use the first occurrence"
        );
    }
}

fn required_name(name: Option<&str>) -> Result<String, CatalogError> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CatalogError::Validation("name is required".into()))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
