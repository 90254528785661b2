//! Tantivy-based product search.
//!
//! Backs the product picker of the hotspot editor, where operators find the
//! product to tag by typing part of its name.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Product;

/// Field boost values.
const BOOST_NAME: f32 = 10.0;
const BOOST_SLUG: f32 = 4.0;
const BOOST_CATEGORY: f32 = 2.0;

/// Search result with product id and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub product_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    product_id: Field,
    name: Field,
    slug: Field,
    category: Field,
}

/// Tantivy search index for products.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let product_id = schema_builder.add_text_field("product_id", STRING | STORED);
        let name = schema_builder.add_text_field("name", TEXT | STORED);
        let slug = schema_builder.add_text_field("slug", TEXT);
        let category = schema_builder.add_text_field("category", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            product_id,
            name,
            slug,
            category,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from products.
    pub async fn rebuild(&self, products: &[Product]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for product in products {
            writer.add_document(self.create_document(product))?;
        }
        writer.commit()?;

        // Reload reader to see new documents
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} products", products.len());
        Ok(())
    }

    /// Index a single product, replacing any previous document for it.
    pub async fn index_product(&self, product: &Product) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.product_id, &product.id);
        writer.delete_term(term);
        writer.add_document(self.create_document(product))?;
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Remove a product from the index.
    pub async fn remove_product(&self, product_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.product_id, product_id);
        writer.delete_term(term);
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search for products matching the query.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.name, self.fields.slug, self.fields.category],
        );
        let base_query = query_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();
        let field_queries = [
            (self.fields.name, BOOST_NAME),
            (self.fields.slug, BOOST_SLUG),
            (self.fields.category, BOOST_CATEGORY),
        ];

        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                let boosted = BoostQuery::new(field_query, boost);
                subqueries.push((Occur::Should, Box::new(boosted)));
            }
        }

        let combined_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(limit))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results = top_docs
            .into_iter()
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let product_id = doc.get_first(self.fields.product_id)?.as_str()?.to_string();
                Some(SearchResult { product_id, score })
            })
            .collect();

        Ok(results)
    }

    fn create_document(&self, product: &Product) -> TantivyDocument {
        // Slugs are dash-separated; index them as words.
        let slug_words = product.slug.replace('-', " ");

        doc!(
            self.fields.product_id => product.id.clone(),
            self.fields.name => product.name.clone(),
            self.fields.slug => slug_words,
            self.fields.category => product.category_id.clone().unwrap_or_default().replace('-', " ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_product(id: &str, name: &str, slug: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: 9_900_000,
            original_price: None,
            image_url: None,
            slug: slug.to_string(),
            category_id: Some("phong-khach".to_string()),
        }
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let products = vec![
            create_test_product("1", "Sofa Oslo", "sofa-oslo"),
            create_test_product("2", "Armchair Bergen", "armchair-bergen"),
        ];
        index.rebuild(&products).await.unwrap();

        let results = index.search("oslo", 10).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].product_id, "1");
    }

    #[tokio::test]
    async fn test_removed_product_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        index
            .index_product(&create_test_product("1", "Bàn trà Lund", "ban-tra-lund"))
            .await
            .unwrap();
        assert_eq!(index.search("lund", 10).unwrap().len(), 1);

        index.remove_product("1").await.unwrap();
        assert!(index.search("lund", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        assert!(index.search("  ", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_zero_limit() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index
            .rebuild(&[create_test_product("1", "Sofa Oslo", "sofa-oslo")])
            .await
            .unwrap();

        assert!(index.search("sofa", 0).unwrap().is_empty());
    }
}
