//! Hierarchy Walker
//!
//! Discovers every account below a root manager (MCC) by querying one level
//! of children per manager. The walk is depth-first and driven by an explicit
//! stack of frames, so deep hierarchies cannot overflow the call stack. A
//! single account cap and a single visited-manager set are shared by every
//! branch of one walk.

use crate::domain::entities::account::{AccountNode, ChildAccount};
use crate::domain::errors::ReportError;
use crate::domain::repositories::ads_gateway::AdsGateway;
use crate::domain::value_objects::credential::Credential;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default cap on discovered accounts (the synthetic root is not counted)
pub const DEFAULT_MAX_ACCOUNTS: usize = 200;

/// Name given to the root when its own lookup fails
pub const UNKNOWN_ROOT_NAME: &str = "Unknown Root Manager";

/// Children of one manager still waiting to be visited
struct Frame {
    parent_id: String,
    depth: usize,
    children: std::vec::IntoIter<ChildAccount>,
}

/// Bookkeeping owned by one walk
struct WalkState {
    records: Vec<AccountNode>,
    visited_managers: HashSet<String>,
    max_accounts: usize,
}

impl WalkState {
    fn new(max_accounts: usize) -> Self {
        Self {
            records: Vec::new(),
            visited_managers: HashSet::new(),
            max_accounts,
        }
    }

    fn cap_reached(&self) -> bool {
        self.records.len() >= self.max_accounts
    }
}

pub struct HierarchyWalker {
    gateway: Arc<dyn AdsGateway>,
    default_root_id: String,
}

impl HierarchyWalker {
    pub fn new(gateway: Arc<dyn AdsGateway>, default_root_id: impl Into<String>) -> Self {
        Self {
            gateway,
            default_root_id: default_root_id.into(),
        }
    }

    /// Discover all accounts under `root_id` (or the configured root).
    ///
    /// Returns at most `max_accounts + 1` nodes with unique customer ids; the
    /// root is appended last with no parent. Branch failures are logged and
    /// treated as empty branches.
    pub async fn discover(
        &self,
        root_id: Option<&str>,
        credential: &Credential,
        max_accounts: usize,
    ) -> Result<Vec<AccountNode>, ReportError> {
        let root_id = root_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.default_root_id.trim());
        if root_id.is_empty() {
            return Err(ReportError::MissingRootAccount);
        }

        let mut state = WalkState::new(max_accounts);
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.open_frame(root_id, 0, credential, &mut state).await {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.children.next() else {
                stack.pop();
                continue;
            };
            if state.cap_reached() {
                break;
            }
            if child.customer_id == frame.parent_id {
                continue;
            }

            let parent_id = frame.parent_id.clone();
            let depth = frame.depth + 1;
            debug!(
                "Discovered account: {} (desc: {}) under parent {} - is_manager: {} (depth {})",
                child.customer_id, child.descriptive_name, parent_id, child.is_manager, depth
            );

            let descend_into = child.is_manager.then(|| child.customer_id.clone());
            state.records.push(AccountNode::child(&parent_id, child));

            if let Some(manager_id) = descend_into {
                if let Some(next) = self
                    .open_frame(&manager_id, depth, credential, &mut state)
                    .await
                {
                    stack.push(next);
                }
            }
        }

        let root_name = self.root_name(root_id, credential).await;
        state.records.push(AccountNode::root(root_id, root_name));
        info!(
            "Discovered {} accounts in total (limit was {})",
            state.records.len(),
            max_accounts
        );

        let unique = dedup_last_wins(state.records);
        info!("Returning {} unique accounts.", unique.len());
        Ok(unique)
    }

    /// Fetch one level of children, unless the cap is hit or the manager was already expanded
    async fn open_frame(
        &self,
        parent_id: &str,
        depth: usize,
        credential: &Credential,
        state: &mut WalkState,
    ) -> Option<Frame> {
        if state.cap_reached() || !state.visited_managers.insert(parent_id.to_string()) {
            return None;
        }

        match self.gateway.discover_children(parent_id, credential).await {
            Ok(children) => Some(Frame {
                parent_id: parent_id.to_string(),
                depth,
                children: children.into_iter(),
            }),
            Err(e) => {
                error!("Error discovering children for {}: {}", parent_id, e);
                None
            }
        }
    }

    async fn root_name(&self, root_id: &str, credential: &Credential) -> String {
        match self.gateway.get_account_name(root_id, credential).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                warn!("No descriptive name returned for root manager {}", root_id);
                UNKNOWN_ROOT_NAME.to_string()
            }
            Err(e) => {
                error!("Could not fetch root manager name for {}: {}", root_id, e);
                UNKNOWN_ROOT_NAME.to_string()
            }
        }
    }
}

/// Keep one node per customer id: first position, last value
fn dedup_last_wins(records: Vec<AccountNode>) -> Vec<AccountNode> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<AccountNode> = Vec::with_capacity(records.len());

    for record in records {
        match slots.get(&record.customer_id) {
            Some(&slot) => unique[slot] = record,
            None => {
                slots.insert(record.customer_id.clone(), unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::spend::CampaignCost;
    use crate::domain::errors::{GatewayError, GatewayResult};
    use crate::domain::value_objects::date_range::DateRange;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn child(id: &str, is_manager: bool) -> ChildAccount {
        ChildAccount {
            customer_id: id.to_string(),
            is_manager,
            descriptive_name: format!("Account {}", id),
        }
    }

    /// In-memory hierarchy keyed by manager id
    struct TreeGateway {
        children: HashMap<String, GatewayResult<Vec<ChildAccount>>>,
        root_name: GatewayResult<Option<String>>,
        queried: Mutex<Vec<String>>,
    }

    impl TreeGateway {
        fn new(edges: Vec<(&str, Vec<ChildAccount>)>) -> Self {
            Self {
                children: edges
                    .into_iter()
                    .map(|(parent, kids)| (parent.to_string(), Ok(kids)))
                    .collect(),
                root_name: Ok(Some("Root MCC".to_string())),
                queried: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, parent: &str) -> Self {
            self.children.insert(
                parent.to_string(),
                Err(GatewayError::Network("connection reset".to_string())),
            );
            self
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AdsGateway for TreeGateway {
        fn name(&self) -> &str {
            "tree"
        }

        async fn discover_children(
            &self,
            parent_id: &str,
            _credential: &Credential,
        ) -> GatewayResult<Vec<ChildAccount>> {
            self.queried.lock().unwrap().push(parent_id.to_string());
            self.children
                .get(parent_id)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn get_account_name(
            &self,
            _account_id: &str,
            _credential: &Credential,
        ) -> GatewayResult<Option<String>> {
            self.root_name.clone()
        }

        async fn get_campaign_costs(
            &self,
            _account_id: &str,
            _login_customer_id: &str,
            _credential: &Credential,
            _range: &DateRange,
        ) -> GatewayResult<Vec<CampaignCost>> {
            Ok(Vec::new())
        }
    }

    fn credential() -> Credential {
        Credential::new("refresh").unwrap()
    }

    fn ids(nodes: &[AccountNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.customer_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_depth_first_order_with_root_last() {
        let gateway = Arc::new(TreeGateway::new(vec![
            ("100", vec![child("200", true), child("300", false)]),
            ("200", vec![child("210", false), child("220", false)]),
        ]));
        let walker = HierarchyWalker::new(gateway.clone(), "100");

        let nodes = walker.discover(None, &credential(), 200).await.unwrap();

        assert_eq!(ids(&nodes), vec!["200", "210", "220", "300", "100"]);
        assert_eq!(nodes[1].parent_id.as_deref(), Some("200"));
        let root = nodes.last().unwrap();
        assert!(root.is_manager);
        assert!(root.parent_id.is_none());
        assert_eq!(root.descriptive_name, "Root MCC");
        assert_eq!(gateway.queried(), vec!["100", "200"]);
    }

    #[tokio::test]
    async fn test_self_reference_is_dropped() {
        let gateway = Arc::new(TreeGateway::new(vec![(
            "100",
            vec![child("100", true), child("300", false)],
        )]));
        let walker = HierarchyWalker::new(gateway, "100");

        let nodes = walker.discover(None, &credential(), 200).await.unwrap();

        assert_eq!(ids(&nodes), vec!["300", "100"]);
        assert!(nodes
            .iter()
            .all(|n| n.parent_id.as_deref() != Some(n.customer_id.as_str())));
    }

    #[tokio::test]
    async fn test_cycle_visits_each_manager_once() {
        let gateway = Arc::new(TreeGateway::new(vec![
            ("100", vec![child("200", true)]),
            ("200", vec![child("300", true)]),
            ("300", vec![child("200", true), child("100", true)]),
        ]));
        let walker = HierarchyWalker::new(gateway.clone(), "100");

        let nodes = walker.discover(None, &credential(), 200).await.unwrap();

        assert_eq!(gateway.queried(), vec!["100", "200", "300"]);
        assert_eq!(ids(&nodes), vec!["200", "300", "100"]);
        // Root duplicate discovered under 300 is replaced by the synthetic root
        let root = nodes.iter().find(|n| n.customer_id == "100").unwrap();
        assert!(root.parent_id.is_none());
        // Last write wins for 200: the record found under 300
        let manager = nodes.iter().find(|n| n.customer_id == "200").unwrap();
        assert_eq!(manager.parent_id.as_deref(), Some("300"));
    }

    #[tokio::test]
    async fn test_cap_is_global_across_branches() {
        let gateway = Arc::new(TreeGateway::new(vec![
            ("100", vec![child("200", true), child("300", true)]),
            ("200", vec![child("210", false), child("220", false)]),
            ("300", vec![child("310", false), child("320", false)]),
        ]));
        let walker = HierarchyWalker::new(gateway.clone(), "100");

        let nodes = walker.discover(None, &credential(), 3).await.unwrap();

        assert_eq!(ids(&nodes), vec!["200", "210", "220", "100"]);
        assert!(nodes.len() <= 3 + 1);
        assert_eq!(gateway.queried(), vec!["100", "200"]);
    }

    #[tokio::test]
    async fn test_zero_cap_returns_only_root() {
        let gateway = Arc::new(TreeGateway::new(vec![("100", vec![child("200", false)])]));
        let walker = HierarchyWalker::new(gateway.clone(), "100");

        let nodes = walker.discover(None, &credential(), 0).await.unwrap();

        assert_eq!(ids(&nodes), vec!["100"]);
        assert!(gateway.queried().is_empty());
    }

    #[tokio::test]
    async fn test_failed_branch_does_not_abort_walk() {
        let gateway = Arc::new(
            TreeGateway::new(vec![
                ("100", vec![child("200", true), child("300", true)]),
                ("300", vec![child("310", false)]),
            ])
            .failing("200"),
        );
        let walker = HierarchyWalker::new(gateway, "100");

        let nodes = walker.discover(None, &credential(), 200).await.unwrap();

        assert_eq!(ids(&nodes), vec!["200", "300", "310", "100"]);
    }

    #[tokio::test]
    async fn test_root_name_failure_uses_placeholder() {
        let mut tree = TreeGateway::new(vec![]);
        tree.root_name = Err(GatewayError::Api {
            status: 403,
            message: "denied".to_string(),
        });
        let walker = HierarchyWalker::new(Arc::new(tree), "100");

        let nodes = walker.discover(None, &credential(), 200).await.unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].descriptive_name, UNKNOWN_ROOT_NAME);
    }

    #[tokio::test]
    async fn test_explicit_root_overrides_default() {
        let gateway = Arc::new(TreeGateway::new(vec![("555", vec![child("556", false)])]));
        let walker = HierarchyWalker::new(gateway, "100");

        let nodes = walker
            .discover(Some(" 555 "), &credential(), 200)
            .await
            .unwrap();

        assert_eq!(ids(&nodes), vec!["556", "555"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_rejected() {
        let walker = HierarchyWalker::new(Arc::new(TreeGateway::new(vec![])), "");

        let result = walker.discover(None, &credential(), 200).await;

        assert!(matches!(result, Err(ReportError::MissingRootAccount)));
    }
}
