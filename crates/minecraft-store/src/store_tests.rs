#[cfg(test)]
mod tests {
    use crate::store::WhitelistStore;
    use minecraft_types::{PlayerEntry, ServerEndpoint};
    use tempfile::TempDir;

    const GUILD: u64 = 1001;

    fn open(dir: &TempDir) -> WhitelistStore {
        WhitelistStore::open(dir.path()).unwrap()
    }

    #[tokio::test]
    async fn test_member_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        assert!(store.member(GUILD, 42).await.unwrap().is_none());
        store
            .put_member(GUILD, 42, PlayerEntry::new("Alex"))
            .await
            .unwrap();
        assert_eq!(
            store.member(GUILD, 42).await.unwrap(),
            Some(PlayerEntry::new("Alex"))
        );

        let removed = store.remove_member(GUILD, 42).await.unwrap();
        assert_eq!(removed, Some(PlayerEntry::new("Alex")));
        assert!(store.member(GUILD, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_absent_member_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        assert!(store.remove_member(GUILD, 42).await.unwrap().is_none());
        // No document should have been written for a pure read path.
        assert!(store.known_guilds().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_member_is_upsert() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store
            .put_member(GUILD, 42, PlayerEntry::new("Alex"))
            .await
            .unwrap();
        store
            .put_member(GUILD, 42, PlayerEntry::new("Alexander"))
            .await
            .unwrap();
        assert_eq!(
            store.member(GUILD, 42).await.unwrap(),
            Some(PlayerEntry::new("Alexander"))
        );
        assert_eq!(store.members(GUILD).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_removal_has_set_semantics() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store
            .enqueue_removal(GUILD, PlayerEntry::new("Alex"))
            .await
            .unwrap();
        store
            .enqueue_removal(GUILD, PlayerEntry::new("Alex"))
            .await
            .unwrap();
        assert_eq!(
            store.pending_removals(GUILD).await.unwrap(),
            vec![PlayerEntry::new("Alex")]
        );
    }

    #[tokio::test]
    async fn test_pending_removals_preserve_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        for name in ["Charlie", "Alex", "Bo"] {
            store
                .enqueue_removal(GUILD, PlayerEntry::new(name))
                .await
                .unwrap();
        }
        let names: Vec<_> = store
            .pending_removals(GUILD)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Charlie", "Alex", "Bo"]);

        store.dequeue_removal(GUILD, "Alex").await.unwrap();
        let names: Vec<_> = store
            .pending_removals(GUILD)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Charlie", "Bo"]);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir);
            store
                .put_member(GUILD, 42, PlayerEntry::new("Alex"))
                .await
                .unwrap();
            store
                .enqueue_removal(GUILD, PlayerEntry::new("Steve"))
                .await
                .unwrap();
            store
                .set_endpoint(
                    GUILD,
                    ServerEndpoint {
                        host: "mc.example.org".to_string(),
                        password: "hunter2".to_string(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        // A fresh store over the same directory sees everything.
        let store = open(&dir);
        assert_eq!(
            store.member(GUILD, 42).await.unwrap(),
            Some(PlayerEntry::new("Alex"))
        );
        assert_eq!(
            store.pending_removals(GUILD).await.unwrap(),
            vec![PlayerEntry::new("Steve")]
        );
        let endpoint = store.endpoint(GUILD).await.unwrap();
        assert_eq!(endpoint.host, "mc.example.org");
        assert_eq!(endpoint.password, "hunter2");
        assert_eq!(store.known_guilds().await.unwrap(), vec![GUILD]);
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store
            .put_member(GUILD, 42, PlayerEntry::new("Alex"))
            .await
            .unwrap();
        store
            .put_member(GUILD + 1, 42, PlayerEntry::new("AlexElsewhere"))
            .await
            .unwrap();

        store.remove_member(GUILD, 42).await.unwrap();
        assert_eq!(
            store.member(GUILD + 1, 42).await.unwrap(),
            Some(PlayerEntry::new("AlexElsewhere"))
        );
        assert_eq!(
            store.known_guilds().await.unwrap(),
            vec![GUILD, GUILD + 1]
        );
    }

    #[tokio::test]
    async fn test_forget_user_erases_across_guilds() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store
            .put_member(GUILD, 42, PlayerEntry::new("Alex"))
            .await
            .unwrap();
        store
            .put_member(GUILD + 1, 42, PlayerEntry::new("AlexElsewhere"))
            .await
            .unwrap();
        store
            .put_member(GUILD + 1, 43, PlayerEntry::new("Bystander"))
            .await
            .unwrap();
        store
            .enqueue_removal(GUILD, PlayerEntry::new("Alex"))
            .await
            .unwrap();

        store.forget_user(42).await.unwrap();

        assert!(store.member(GUILD, 42).await.unwrap().is_none());
        assert!(store.member(GUILD + 1, 42).await.unwrap().is_none());
        assert_eq!(
            store.member(GUILD + 1, 43).await.unwrap(),
            Some(PlayerEntry::new("Bystander"))
        );
        // Queued revocations are kept: they are access intent, not identity.
        assert_eq!(
            store.pending_removals(GUILD).await.unwrap(),
            vec![PlayerEntry::new("Alex")]
        );
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store
            .put_member(GUILD, 42, PlayerEntry::new("Alex"))
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
