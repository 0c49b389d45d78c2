//! Managed-object inventory over `/inventory/managedObjects`.

use async_trait::async_trait;
use serde::Deserialize;

use streamsight_core::api::{Inventory, InventoryFilter, InventoryQuery};
use streamsight_core::config::paths;
use streamsight_core::error::Result;
use streamsight_core::model::{ManagedObject, PagedResult, PageStatistics};

use crate::client::PlatformClient;

/// Wire envelope of an inventory page.
#[derive(Debug, Deserialize)]
struct ManagedObjectPage {
    #[serde(rename = "managedObjects", default)]
    managed_objects: Vec<ManagedObject>,
    #[serde(default)]
    statistics: PageStatistics,
}

impl From<ManagedObjectPage> for PagedResult<ManagedObject> {
    fn from(page: ManagedObjectPage) -> Self {
        PagedResult::new(page.managed_objects, page.statistics)
    }
}

fn filter_params(filter: &InventoryFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("pageSize", filter.page_size.to_string()),
        ("withTotalPages", filter.with_total_pages.to_string()),
    ];
    if let Some(fragment_type) = &filter.fragment_type {
        params.push(("fragmentType", fragment_type.clone()));
    }
    params
}

/// Render an attribute query in the platform's query language.
fn query_expression(query: &InventoryQuery) -> String {
    let mut terms = Vec::new();
    if let Some(name) = &query.name {
        terms.push(format!("name eq '{name}'"));
    }
    if let Some(application_id) = &query.application_id {
        terms.push(format!("applicationId eq '{application_id}'"));
    }
    terms.join(" and ")
}

#[async_trait]
impl Inventory for PlatformClient {
    async fn list(&self, filter: &InventoryFilter) -> Result<PagedResult<ManagedObject>> {
        let page: ManagedObjectPage = self
            .get_json(paths::INVENTORY, &filter_params(filter))
            .await?;
        Ok(page.into())
    }

    async fn query(
        &self,
        query: &InventoryQuery,
        filter: &InventoryFilter,
    ) -> Result<PagedResult<ManagedObject>> {
        let mut params = filter_params(filter);
        params.push(("query", query_expression(query)));
        let page: ManagedObjectPage = self.get_json(paths::INVENTORY, &params).await?;
        Ok(page.into())
    }

    async fn get(&self, id: &str) -> Result<ManagedObject> {
        self.get_json(&format!("{}/{id}", paths::INVENTORY), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params() {
        let filter = InventoryFilter::default()
            .with_page_size(100)
            .with_fragment_type("pas_extension");
        let params = filter_params(&filter);
        assert!(params.contains(&("pageSize", "100".to_string())));
        assert!(params.contains(&("withTotalPages", "true".to_string())));
        assert!(params.contains(&("fragmentType", "pas_extension".to_string())));
    }

    #[test]
    fn test_query_expression() {
        let query = InventoryQuery {
            name: Some("cep-ctrl".to_string()),
            application_id: Some("99".to_string()),
        };
        assert_eq!(
            query_expression(&query),
            "name eq 'cep-ctrl' and applicationId eq '99'"
        );
    }

    #[test]
    fn test_page_envelope_parses() {
        let page: ManagedObjectPage = serde_json::from_str(
            r#"{
                "managedObjects": [
                    { "id": "815", "name": "Math_AB_Extension.zip", "pas_extension": "Math_AB_Extension" }
                ],
                "statistics": { "currentPage": 1, "pageSize": 100, "totalPages": 1 }
            }"#,
        )
        .unwrap();
        let result: PagedResult<ManagedObject> = page.into();
        assert_eq!(result.len(), 1);
        assert_eq!(result.statistics.total_pages, Some(1));
    }
}
