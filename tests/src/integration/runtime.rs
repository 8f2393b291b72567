//! # Runtime Protocol Flows
//!
//! Drives the headless host through its line protocol with a real state
//! directory, including state written by an earlier process.

#[cfg(test)]
mod tests {
    use nav_coordinator::{
        CoordinatorConfig, FileStore, GuardContext, KeyValueStore, NavigationMode, StateNode,
        StateTree,
    };
    use nav_runtime::{NavRuntime, Response, RuntimeConfig, Session};
    use serde_json::json;
    use tempfile::TempDir;

    const KEY: &str = "nav_state_app_u1_test";

    fn config(dir: &TempDir) -> RuntimeConfig {
        RuntimeConfig {
            coordinator: CoordinatorConfig::for_testing(),
            state_dir: dir.path().to_path_buf(),
            initial_route: "HomeStack".to_string(),
            session: Session {
                mode: NavigationMode::App,
                user: Some("u1".to_string()),
                context: GuardContext::new(true, false, false, NavigationMode::App),
            },
        }
    }

    #[tokio::test]
    async fn test_corrupt_state_file_falls_back_to_initial_route() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.set(KEY, "{not json".to_string()).await.unwrap();

        let runtime = NavRuntime::start(config(&dir)).await.unwrap();
        assert_eq!(runtime.controller().current_route().as_deref(), Some("HomeStack"));
        assert_eq!(store.get(KEY).await.unwrap(), None);
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_legacy_tree_without_version_is_restored() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let legacy = StateTree::new(
            vec![StateNode::leaf("HomeStack"), StateNode::leaf("BookmarksScreen")],
            1,
        );
        store
            .set(KEY, serde_json::to_string(&legacy).unwrap())
            .await
            .unwrap();

        let runtime = NavRuntime::start(config(&dir)).await.unwrap();
        let state = runtime.handle_line(r#"{"op":"state"}"#).await;
        assert_eq!(
            state,
            Response::with_data(serde_json::to_value(&legacy).unwrap())
        );
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_guest_redirect_is_reported() {
        let dir = TempDir::new().unwrap();
        let runtime = NavRuntime::start(config(&dir)).await.unwrap();

        runtime
            .handle_line(r#"{"op":"session","isGuestMode":true}"#)
            .await;
        let response = runtime
            .handle_line(r#"{"op":"command","command":{"type":"navigate","routeName":"ProfileScreen"}}"#)
            .await;
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "denied",
                "reason": "Profile screen is not available in guest mode",
                "redirectTo": "HomeScreen"
            })
        );

        let flushed = runtime.handle_line(r#"{"op":"flush"}"#).await;
        assert_eq!(flushed, Response::ok());
        runtime.shutdown().await;
    }
}
