use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::RwLock;

use super::{
    Idea, IdeaId, IdeaRepository, IdeaUpdate, MessageRepository, NewIdea, check_title,
};
use crate::conversation::{ConversationId, ConversationMessage};
use crate::error::{Error, Result};

/// An in-process store.
///
/// Ideas are kept as encoded rows and decoded strictly on every read, so a
/// row that no longer has the idea shape is reported instead of being
/// papered over.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ideas: RwLock<HashMap<IdeaId, String>>,
    messages: RwLock<HashMap<ConversationId, Vec<ConversationMessage>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    async fn load(&self, id: IdeaId) -> Result<Option<Idea>> {
        let ideas = self.ideas.read().await;
        ideas.get(&id).map(|row| Idea::from_json(row)).transpose()
    }

    async fn save(&self, idea: &Idea) -> Result<()> {
        let row = idea.to_json()?;
        self.ideas.write().await.insert(idea.id, row);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Idea>> {
        let ideas = self.ideas.read().await;
        let mut all = ideas
            .values()
            .map(|row| Idea::from_json(row))
            .collect::<Result<Vec<_>>>()?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

/// Rows keep millisecond precision, so stamp with no more than that.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[async_trait]
impl IdeaRepository for MemoryStore {
    async fn create(&self, idea: NewIdea) -> Result<Idea> {
        check_title(&idea.title)?;
        let now = now();
        let idea = Idea {
            id: IdeaId::new(),
            title: idea.title,
            created_at: now,
            updated_at: now,
            tags: idea.tags,
            status: idea.status,
            summary: idea.summary,
            report_md: String::new(),
            report_json: None,
            synced_at: None,
        };
        self.save(&idea).await?;
        debug!("created idea {}", idea.id);
        Ok(idea)
    }

    async fn find_all(&self) -> Result<Vec<Idea>> {
        self.load_all().await
    }

    async fn find_by_id(&self, id: IdeaId) -> Result<Option<Idea>> {
        self.load(id).await
    }

    async fn update(&self, id: IdeaId, update: IdeaUpdate) -> Result<Idea> {
        let mut ideas = self.ideas.write().await;
        let Some(row) = ideas.get_mut(&id) else {
            return Err(Error::not_found("idea", id));
        };
        let mut idea = Idea::from_json(row)?;
        update.apply(&mut idea);
        check_title(&idea.title)?;
        idea.updated_at = now().max(idea.updated_at);
        *row = idea.to_json()?;
        Ok(idea)
    }

    async fn delete(&self, id: IdeaId) -> Result<()> {
        let mut ideas = self.ideas.write().await;
        let mut messages = self.messages.write().await;
        if ideas.remove(&id).is_none() {
            return Err(Error::not_found("idea", id));
        }
        messages.remove(&id);
        debug!("deleted idea {id}");
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Idea>> {
        let needle = query.to_lowercase();
        let mut found = self.load_all().await?;
        found.retain(|idea| idea.matches(&needle));
        Ok(found)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn create_message(&self, message: &ConversationMessage) -> Result<()> {
        self.messages
            .write()
            .await
            .entry(message.conversation_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn create_messages(&self, messages: &[ConversationMessage]) -> Result<()> {
        let mut stored = self.messages.write().await;
        for msg in messages {
            stored
                .entry(msg.conversation_id())
                .or_default()
                .push(msg.clone());
        }
        Ok(())
    }

    async fn find_messages_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ConversationMessage>> {
        let messages = self.messages.read().await;
        let mut found = messages.get(&conversation_id).cloned().unwrap_or_default();
        found.sort_by_key(ConversationMessage::timestamp);
        Ok(found)
    }

    async fn delete_messages_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<()> {
        self.messages.write().await.remove(&conversation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conversation::{ConversationState, Role};
    use crate::store::IdeaStatus;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();
        let idea = store.create(NewIdea::draft("HabitLoop")).await.unwrap();
        assert_eq!(idea.status, IdeaStatus::Draft);
        assert_eq!(idea.created_at, idea.updated_at);
        assert!(idea.report_json.is_none());

        let found = store.find_by_id(idea.id).await.unwrap();
        assert_eq!(found, Some(idea));
        assert_eq!(store.find_by_id(IdeaId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let store = MemoryStore::new();
        let first = store.create(NewIdea::draft("First")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.create(NewIdea::draft("Second")).await.unwrap();

        let all = store.find_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|idea| idea.id).collect();
        assert_eq!(ids, [second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update() {
        let store = MemoryStore::new();
        let idea = store.create(NewIdea::draft("HabitLoop")).await.unwrap();

        let updated = store
            .update(
                idea.id,
                IdeaUpdate {
                    status: Some(IdeaStatus::Refined),
                    summary: Some("Adaptive habit goals".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "HabitLoop");
        assert_eq!(updated.status, IdeaStatus::Refined);
        assert_eq!(updated.summary, "Adaptive habit goals");
        assert!(updated.updated_at >= idea.updated_at);
        assert_eq!(updated.created_at, idea.created_at);
        assert_eq!(store.find_by_id(idea.id).await.unwrap(), Some(updated));

        let missing = IdeaId::new();
        let err = store.update(missing, IdeaUpdate::default()).await.unwrap_err();
        assert_eq!(err, Error::not_found("idea", missing));
    }

    #[tokio::test]
    async fn test_search() {
        let store = MemoryStore::new();
        let habit = store.create(NewIdea::draft("HabitLoop")).await.unwrap();
        let garden = store
            .create(NewIdea {
                title: "Plot".to_owned(),
                summary: "Community garden planner".to_owned(),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = store.search("habit").await.unwrap();
        assert_eq!(found, [habit.clone()]);
        let found = store.search("GARDEN").await.unwrap();
        assert_eq!(found, [garden]);
        assert_eq!(store.search("").await.unwrap().len(), 2);
        assert!(store.search("rocket").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messages_in_order() {
        let store = MemoryStore::new();
        let state = ConversationState::new(ConversationId::new())
            .appended(Role::User, "A tool for tracking habits")
            .appended(Role::Assistant, "Who is it for?")
            .appended(Role::User, "Busy parents");

        for msg in state.messages().iter().rev() {
            store.create_message(msg).await.unwrap();
        }
        let found = store
            .find_messages_by_conversation(state.conversation_id())
            .await
            .unwrap();
        assert_eq!(found, state.messages());

        let other = store
            .find_messages_by_conversation(ConversationId::new())
            .await
            .unwrap();
        assert!(other.is_empty());

        store
            .delete_messages_by_conversation(state.conversation_id())
            .await
            .unwrap();
        assert!(
            store
                .find_messages_by_conversation(state.conversation_id())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = Arc::new(MemoryStore::new());
        let idea = store.create(NewIdea::draft("HabitLoop")).await.unwrap();
        let state = ConversationState::new(idea.id).appended(Role::User, "Hi");
        store.create_message(&state.messages()[0]).await.unwrap();

        store.delete(idea.id).await.unwrap();
        assert_eq!(store.find_by_id(idea.id).await.unwrap(), None);
        assert!(store.find_messages_by_conversation(idea.id).await.unwrap().is_empty());

        let err = store.delete(idea.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "idea", .. }));
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let store = MemoryStore::new();
        let err = store.create(NewIdea::draft("")).await.unwrap_err();
        assert!(matches!(err, Error::ReportValidation(_)));
        assert!(store.find_all().await.unwrap().is_empty());

        let idea = store.create(NewIdea::draft("HabitLoop")).await.unwrap();
        let update = IdeaUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        let err = store.update(idea.id, update).await.unwrap_err();
        assert!(matches!(err, Error::ReportValidation(_)));
        assert_eq!(store.find_by_id(idea.id).await.unwrap(), Some(idea));
    }

    #[tokio::test]
    async fn test_update_does_not_revive_deleted() {
        let store = Arc::new(MemoryStore::new());
        let idea = store.create(NewIdea::draft("HabitLoop")).await.unwrap();

        let updating = {
            let store = store.clone();
            tokio::spawn(async move {
                let update = IdeaUpdate {
                    summary: Some("Adaptive habit goals".to_owned()),
                    ..Default::default()
                };
                store.update(idea.id, update).await
            })
        };
        let deleting = {
            let store = store.clone();
            tokio::spawn(async move { store.delete(idea.id).await })
        };
        let updated = updating.await.unwrap();
        deleting.await.unwrap().unwrap();

        assert_eq!(store.find_by_id(idea.id).await.unwrap(), None);
        if let Err(err) = updated {
            assert_eq!(err, Error::not_found("idea", idea.id));
        }
        let err = store.update(idea.id, IdeaUpdate::default()).await.unwrap_err();
        assert_eq!(err, Error::not_found("idea", idea.id));
    }

    #[tokio::test]
    async fn test_create_messages() {
        let store = MemoryStore::new();
        let state = ConversationState::new(ConversationId::new())
            .appended(Role::User, "A tool for tracking habits")
            .appended(Role::Assistant, "Who is it for?");

        store.create_messages(state.messages()).await.unwrap();
        store.create_messages(&[]).await.unwrap();
        let found = store
            .find_messages_by_conversation(state.conversation_id())
            .await
            .unwrap();
        assert_eq!(found, state.messages());
    }

    #[tokio::test]
    async fn test_trait_objects() {
        let store = Arc::new(MemoryStore::new());
        let ideas: Arc<dyn IdeaRepository> = store.clone();
        let messages: Arc<dyn MessageRepository> = store;

        let idea = ideas.create(NewIdea::draft("HabitLoop")).await.unwrap();
        let state = ConversationState::new(idea.id).appended(Role::User, "Hi");
        messages.create_message(&state.messages()[0]).await.unwrap();
        assert_eq!(
            messages.find_messages_by_conversation(idea.id).await.unwrap().len(),
            1
        );
    }
}
