//! API client for the Firepower Management Center REST API.
//!
//! This module provides the `FmcClient` struct, which builds the
//! domain-scoped endpoint paths and runs the listing, detail-fetch and
//! mutation calls over an authenticated `Session`.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::ApiError;
use crate::auth::{ApiRequest, Session};
use crate::models::{
    AccessPolicy, AccessRule, DomainInfo, DynamicObject, DynamicObjectMapping, ListResponse,
    MappingAction, NewDynamicObject, StaticObject,
};
use crate::utils::normalize_addresses;

// ============================================================================
// Constants
// ============================================================================

/// Domain discovery endpoint (platform namespace, not domain-scoped)
const DOMAIN_INFO_PATH: &str = "/api/fmc_platform/v1/info/domain";

/// Page size requested from listing endpoints.
/// 1000 is the largest limit the management API accepts.
const PAGE_LIMIT: u32 = 1000;

/// Upper bound on pages followed for one listing.
/// Guards against a server that keeps returning a `next` link.
const MAX_PAGES: usize = 10_000;

/// Static object collections synced, with a label for logging
const STATIC_OBJECT_TYPES: &[(&str, &str)] = &[
    ("networks", "network objects"),
    ("hosts", "host objects"),
    ("networkgroups", "network groups"),
    ("networkaddresses", "network addresses"),
];

/// Domain-scoped client for the management API.
/// Clone is cheap - the session shares its HTTP client and token.
#[derive(Clone)]
pub struct FmcClient {
    session: Session,
    domain_uuid: String,
}

impl FmcClient {
    pub fn new(session: Session, domain_uuid: impl Into<String>) -> Self {
        Self {
            session,
            domain_uuid: domain_uuid.into(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn domain_uuid(&self) -> &str {
        &self.domain_uuid
    }

    /// Look up the UUID of the first domain visible to the session's user.
    /// Used before a domain-scoped client can exist.
    pub async fn fetch_domain_uuid(session: &Session) -> Result<String, ApiError> {
        let value = session.execute(&ApiRequest::get(DOMAIN_INFO_PATH)).await?;
        let page: ListResponse<DomainInfo> = decode(value, DOMAIN_INFO_PATH)?;

        page.items
            .into_iter()
            .next()
            .and_then(|d| d.uuid)
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidResponse("domain info response listed no domain UUID".to_string())
            })
    }

    /// Path under this client's domain, e.g. `object/hosts`
    fn config_path(&self, suffix: &str) -> String {
        format!("/api/fmc_config/v1/domain/{}/{}", self.domain_uuid, suffix)
    }

    /// Re-base a server-supplied link onto the configured host by keeping
    /// only its path and query. The link's own scheme and authority are dropped.
    pub fn rebase_link(link: &str) -> String {
        if let Ok(url) = Url::parse(link) {
            return match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            };
        }

        // Unparseable absolute link: cut after the authority, never inside it
        let rest = match link.find("://") {
            Some(idx) => &link[idx + 3..],
            None => return link.to_string(),
        };
        match rest.find('/') {
            Some(idx) => rest[idx..].to_string(),
            None => "/".to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.session.execute(&request).await?;
        decode(value, &request.target)
    }

    /// Fetch every page of a listing, following `paging.next` links
    pub async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut request = ApiRequest::get(path).with_query("limit", PAGE_LIMIT);

        for page_number in 1..=MAX_PAGES {
            let value = self.session.execute(&request).await?;
            let page: ListResponse<T> = if value.is_null() {
                ListResponse { items: Vec::new(), links: None, paging: None }
            } else {
                decode(value, &request.target)?
            };

            let next = page.next_link().map(Self::rebase_link);
            items.extend(page.items);

            match next {
                Some(next) => {
                    debug!(path = path, page = page_number + 1, "Following next page");
                    request = ApiRequest::get(next);
                }
                None => return Ok(items),
            }
        }

        Err(ApiError::InvalidResponse(format!(
            "{} returned more than {} pages",
            path, MAX_PAGES
        )))
    }

    /// Fetch the full object behind a `links.self` URL
    pub async fn fetch_by_self_link<T: DeserializeOwned>(&self, link: &str) -> Result<T, ApiError> {
        self.get(ApiRequest::get(Self::rebase_link(link))).await
    }

    // ===== Access Control Policies =====

    pub async fn fetch_access_policies(&self) -> Result<Vec<AccessPolicy>, ApiError> {
        let policies: Vec<AccessPolicy> = self
            .list_all(&self.config_path("policy/accesspolicies"))
            .await?;
        info!(count = policies.len(), "Fetched access control policies");
        Ok(policies)
    }

    /// Fetch all rules of a policy in full detail.
    ///
    /// Each listed rule is re-fetched through its self link. A rule whose
    /// detail fetch fails with a request error is skipped; a rule without a
    /// self link is kept as listed.
    pub async fn fetch_access_rules(&self, policy_id: &str) -> Result<Vec<AccessRule>, ApiError> {
        let path = self.config_path(&format!("policy/accesspolicies/{}/accessrules", policy_id));
        let rules: Vec<AccessRule> = self.list_all(&path).await?;
        debug!(policy_id = policy_id, count = rules.len(), "Fetching rule details");

        let mut detailed = Vec::with_capacity(rules.len());
        for rule in rules {
            let Some(link) = rule.self_link().map(str::to_string) else {
                // Kept as the listed summary rather than dropped
                detailed.push(rule);
                continue;
            };

            match self.fetch_by_self_link::<AccessRule>(&link).await {
                Ok(detail) => detailed.push(detail),
                Err(e) if e.is_item_level() => {
                    warn!(policy_id = policy_id, rule_id = %rule.id, error = %e, "Skipping rule detail");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(detailed)
    }

    // ===== Dynamic Objects =====

    /// Fetch all dynamic objects, with `content` filled for IP-typed ones
    pub async fn fetch_dynamic_objects(&self) -> Result<Vec<DynamicObject>, ApiError> {
        let mut objects: Vec<DynamicObject> =
            self.list_all(&self.config_path("object/dynamicobjects")).await?;
        info!(count = objects.len(), "Fetched dynamic objects");

        for object in &mut objects {
            if !object.is_ip_typed() {
                debug!(name = %object.name, "Dynamic object is not IP-typed, no mappings fetched");
                continue;
            }

            match self.fetch_mappings(&object.id).await {
                Ok(ips) => {
                    debug!(name = %object.name, count = ips.len(), "Fetched mappings");
                    object.content = ips;
                }
                Err(e) if e.is_item_level() => {
                    warn!(name = %object.name, id = %object.id, error = %e, "Failed to fetch mappings");
                    object.content.clear();
                }
                Err(e) => return Err(e),
            }
        }

        Ok(objects)
    }

    fn mappings_path(&self, object_id: &str) -> String {
        self.config_path(&format!("object/dynamicobjects/{}/mappings", object_id))
    }

    /// Current IP mappings of a dynamic object
    pub async fn fetch_mappings(&self, object_id: &str) -> Result<Vec<String>, ApiError> {
        let mappings: Vec<DynamicObjectMapping> =
            self.list_all(&self.mappings_path(object_id)).await?;
        Ok(mappings
            .into_iter()
            .filter_map(|m| m.mapping)
            .filter(|m| !m.is_empty())
            .collect())
    }

    /// Add or remove the given addresses.
    ///
    /// Only the listed addresses are sent; the server merges them into (or
    /// removes them from) the existing set. An empty list after
    /// normalization sends nothing and returns `Value::Null`.
    pub async fn update_mappings(
        &self,
        object_id: &str,
        action: MappingAction,
        addresses: &[String],
    ) -> Result<Value, ApiError> {
        let addresses = normalize_addresses(addresses);
        if addresses.is_empty() {
            debug!(object_id = object_id, action = %action, "No addresses to update");
            return Ok(Value::Null);
        }

        let request = ApiRequest::put(self.mappings_path(object_id), json!({ "mappings": addresses }))
            .with_query("action", action.as_str());
        let response = self.session.execute(&request).await?;
        info!(object_id = object_id, action = %action, count = addresses.len(), "Updated mappings");
        Ok(response)
    }

    /// Remove every mapping of a dynamic object, returning what was removed
    pub async fn clear_mappings(&self, object_id: &str) -> Result<Vec<String>, ApiError> {
        let existing = self.fetch_mappings(object_id).await?;
        if existing.is_empty() {
            debug!(object_id = object_id, "Dynamic object has no mappings to clear");
            return Ok(existing);
        }

        self.update_mappings(object_id, MappingAction::Remove, &existing)
            .await?;
        Ok(existing)
    }

    pub async fn create_dynamic_object(
        &self,
        new_object: &NewDynamicObject,
    ) -> Result<DynamicObject, ApiError> {
        let body = serde_json::to_value(new_object)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode object: {}", e)))?;
        let created: DynamicObject = self
            .get(ApiRequest::post(self.config_path("object/dynamicobjects"), body))
            .await?;
        info!(name = %created.name, id = %created.id, "Created dynamic object");
        Ok(created)
    }

    // ===== Static Objects =====

    /// Fetch every static object type, merging `literals` from each detail.
    /// A collection whose listing fails with a request error is skipped.
    pub async fn fetch_static_objects(&self) -> Result<Vec<StaticObject>, ApiError> {
        let mut all = Vec::new();

        for (kind, label) in STATIC_OBJECT_TYPES {
            let items: Vec<StaticObject> = match self
                .list_all(&self.config_path(&format!("object/{}", kind)))
                .await
            {
                Ok(items) => items,
                Err(e) if e.is_item_level() => {
                    warn!(kind = kind, error = %e, "Failed to list {}", label);
                    continue;
                }
                Err(e) => return Err(e),
            };
            info!(kind = kind, count = items.len(), "Fetched {}", label);

            for mut item in items {
                if let Some(link) = item.self_link().map(str::to_string) {
                    match self.fetch_by_self_link::<StaticObject>(&link).await {
                        Ok(detail) => {
                            if detail.literals.is_some() {
                                item.literals = detail.literals;
                            }
                        }
                        Err(e) if e.is_item_level() => {
                            warn!(name = %item.name, error = %e, "Failed to fetch object detail");
                        }
                        Err(e) => return Err(e),
                    }
                }
                all.push(item);
            }
        }

        Ok(all)
    }
}

fn decode<T: DeserializeOwned>(value: Value, target: &str) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Unexpected response from {}: {}", target, e)))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{Credentials, TokenCell};

    const DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";

    fn client_for(server: &MockServer) -> FmcClient {
        let creds = Credentials::new(server.uri(), "admin", "secret", false);
        let session = Session::new(creds, TokenCell::with_token("held")).unwrap();
        FmcClient::new(session, DOMAIN)
    }

    fn domain_path(suffix: &str) -> String {
        format!("/api/fmc_config/v1/domain/{}/{}", DOMAIN, suffix)
    }

    #[test]
    fn test_rebase_link() {
        assert_eq!(
            FmcClient::rebase_link("https://10.0.0.9/api/fmc_config/v1/domain/d/object/hosts/h1"),
            "/api/fmc_config/v1/domain/d/object/hosts/h1"
        );
        assert_eq!(FmcClient::rebase_link("/relative"), "/relative");
    }

    #[test]
    fn test_rebase_link_ignores_api_in_hostname() {
        assert_eq!(
            FmcClient::rebase_link("https://api-fmc.corp.example/api/fmc_config/v1/domain/d/object/hosts/h1"),
            "/api/fmc_config/v1/domain/d/object/hosts/h1"
        );
        assert_eq!(
            FmcClient::rebase_link("https://api.fmc:8443/api/fmc_config/v1/domain/d/object/hosts?offset=1000&limit=1000"),
            "/api/fmc_config/v1/domain/d/object/hosts?offset=1000&limit=1000"
        );
    }

    #[tokio::test]
    async fn test_links_from_api_prefixed_host_resolve_against_configured_host() {
        let server = MockServer::start().await;
        let rules_path = domain_path("policy/accesspolicies/p1/accessrules");
        let remote = "https://api-fmc.corp.example";

        Mock::given(method("GET"))
            .and(path(rules_path.as_str()))
            .and(query_param("limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "r1", "links": {"self": format!("{}{}/r1", remote, rules_path)}}],
                "paging": {"offset": 0, "limit": 1, "count": 2, "pages": 2,
                           "next": [format!("{}{}?offset=1&limit=1", remote, rules_path)]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(rules_path.as_str()))
            .and(query_param("offset", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "r2", "links": {"self": format!("{}{}/r2", remote, rules_path)}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        for id in ["r1", "r2"] {
            Mock::given(method("GET"))
                .and(path(format!("{}/{}", rules_path, id)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": id, "name": format!("rule {}", id), "action": "ALLOW"
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        let rules = client.fetch_access_rules("p1").await.unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_deref().unwrap_or_default()).collect();
        assert_eq!(names, vec!["rule r1", "rule r2"]);
        assert_eq!(rules[1].extra["action"], "ALLOW");
    }

    #[tokio::test]
    async fn test_fetch_domain_uuid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOMAIN_INFO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"uuid": DOMAIN, "name": "Global", "type": "Domain"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let uuid = FmcClient::fetch_domain_uuid(client.session()).await.unwrap();
        assert_eq!(uuid, DOMAIN);
    }

    #[tokio::test]
    async fn test_fetch_domain_uuid_empty_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOMAIN_INFO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = FmcClient::fetch_domain_uuid(client.session()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_list_all_follows_next_links() {
        let server = MockServer::start().await;
        let hosts = domain_path("object/hosts");
        let next = format!("https://fmc.invalid{}?offset=1&limit=1", hosts);

        Mock::given(method("GET"))
            .and(path(hosts.as_str()))
            .and(query_param("offset", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "h2", "name": "second"}],
                "paging": {"offset": 1, "limit": 1, "count": 2, "pages": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(hosts.as_str()))
            .and(query_param("limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "h1", "name": "first"}],
                "paging": {"offset": 0, "limit": 1, "count": 2, "pages": 2, "next": [next]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let items: Vec<StaticObject> = client.list_all(&hosts).await.unwrap();
        let names: Vec<&str> = items.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_access_rules_fetch_details_and_skip_failures() {
        let server = MockServer::start().await;
        let base = server.uri();
        let rules_path = domain_path("policy/accesspolicies/p1/accessrules");

        Mock::given(method("GET"))
            .and(path(rules_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "r1", "name": "allow-web", "links": {"self": format!("{}{}/r1", base, rules_path)}},
                    {"id": "r2", "name": "broken", "links": {"self": format!("{}{}/r2", base, rules_path)}},
                    {"id": "r3", "name": "no-link"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/r1", rules_path)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "r1", "name": "allow-web", "action": "ALLOW", "enabled": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/r2", rules_path)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rules = client.fetch_access_rules("p1").await.unwrap();
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r3"]);
        assert_eq!(rules[0].extra.get("action").and_then(Value::as_str), Some("ALLOW"));
    }

    #[tokio::test]
    async fn test_dynamic_objects_fill_content_for_ip_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(domain_path("object/dynamicobjects")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "d1", "name": "blocklist", "objectType": "IP"},
                    {"id": "d2", "name": "macs", "objectType": "MAC"},
                    {"id": "d3", "name": "gone", "objectType": "IP"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(domain_path("object/dynamicobjects/d1/mappings")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"mapping": "10.0.0.1"}, {"mapping": ""}, {"mapping": "10.0.0.2/32"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(domain_path("object/dynamicobjects/d2/mappings")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(domain_path("object/dynamicobjects/d3/mappings")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let objects = client.fetch_dynamic_objects().await.unwrap();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0].content, vec!["10.0.0.1", "10.0.0.2/32"]);
        assert!(objects[1].content.is_empty());
        assert!(objects[2].content.is_empty());
    }

    #[tokio::test]
    async fn test_dynamic_objects_abort_on_exhausted_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(crate::auth::session::TOKEN_PATH))
            .respond_with(ResponseTemplate::new(204).insert_header("X-auth-access-token", "fresh"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(domain_path("object/dynamicobjects")))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_dynamic_objects().await.unwrap_err();
        assert!(matches!(err, ApiError::AuthorizationExhausted));
    }

    #[tokio::test]
    async fn test_static_objects_merge_literals_and_skip_failed_types() {
        let server = MockServer::start().await;
        let base = server.uri();
        let groups = domain_path("object/networkgroups");

        Mock::given(method("GET"))
            .and(path(domain_path("object/networks")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "n1", "name": "lan", "type": "Network", "value": "10.0.0.0/8"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(domain_path("object/hosts")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(groups.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "g1", "name": "servers", "type": "NetworkGroup",
                           "links": {"self": format!("{}{}/g1", base, groups)}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/g1", groups)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "g1", "name": "servers", "type": "NetworkGroup",
                "literals": [{"type": "Host", "value": "10.1.1.1"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(domain_path("object/networkaddresses")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"links": {}})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let objects = client.fetch_static_objects().await.unwrap();
        let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["lan", "servers"]);
        assert!(objects[0].literals.is_none());
        assert_eq!(objects[1].literals.as_ref().unwrap()[0].value, "10.1.1.1");
    }

    #[tokio::test]
    async fn test_update_mappings_sends_action_and_deduped_list() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(domain_path("object/dynamicobjects/d1/mappings")))
            .and(query_param("action", "add"))
            .and(body_json(json!({"mappings": ["10.0.0.1", "10.0.0.2"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mappings": ["10.0.0.1", "10.0.0.2"]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let addresses = vec!["10.0.0.1".to_string(), " 10.0.0.2".to_string(), "10.0.0.1".to_string()];
        client
            .update_mappings("d1", MappingAction::Add, &addresses)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_mappings_empty_list_sends_nothing() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let result = client
            .update_mappings("d1", MappingAction::Remove, &[])
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_mappings_removes_existing() {
        let server = MockServer::start().await;
        let mappings = domain_path("object/dynamicobjects/d1/mappings");

        Mock::given(method("GET"))
            .and(path(mappings.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"mapping": "192.168.1.100/32"}, {"mapping": "172.16.0.1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(mappings.as_str()))
            .and(query_param("action", "remove"))
            .and(body_json(json!({"mappings": ["192.168.1.100/32", "172.16.0.1"]})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let removed = client.clear_mappings("d1").await.unwrap();
        assert_eq!(removed, vec!["192.168.1.100/32", "172.16.0.1"]);
    }

    #[tokio::test]
    async fn test_create_dynamic_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(domain_path("object/dynamicobjects")))
            .and(body_json(json!({"name": "quarantine", "objectType": "IP", "description": "review"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "d9", "name": "quarantine", "objectType": "IP", "description": "review"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client
            .create_dynamic_object(&NewDynamicObject {
                name: "quarantine".into(),
                object_type: "IP".into(),
                description: "review".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, "d9");
        assert!(created.is_ip_typed());
    }
}
