use super::{EntityRepository, RepoError, RepoResult, Updated};
use crate::entity::{Stay, StayDraft, StayState};

pub type StayRepository = EntityRepository<Stay>;

impl EntityRepository<Stay> {
    /// The open stay of a room, or `None` when every stay has ended.
    ///
    /// Nothing stops two open stays from being written concurrently; if that
    /// happened the latest check-in wins.
    pub async fn current_for_room(&self, room_id: &str) -> RepoResult<Option<Stay>> {
        let open: Vec<Stay> = self
            .list_by_parent(room_id)
            .await?
            .into_iter()
            .filter(Stay::is_open)
            .collect();

        if open.len() > 1 {
            tracing::warn!(room_id, open = open.len(), "Room has more than one open stay");
        }
        Ok(open.into_iter().max_by_key(|s| (s.start_time, s.id.clone())))
    }

    /// Create a stay under `room_id`.
    ///
    /// With `exclusive`, a room that already has an open stay is refused. The
    /// check is a plain read, so two racing check-ins can still both land.
    pub async fn check_in(&self, room_id: &str, draft: StayDraft, exclusive: bool) -> RepoResult<Stay> {
        if exclusive && self.current_for_room(room_id).await?.is_some() {
            return Err(RepoError::OpenStayExists {
                room_id: room_id.to_string(),
            });
        }
        self.create(Some(room_id), draft).await
    }
}

impl Updated<Stay> {
    /// `true` when this update moved the stay from open to closed.
    pub fn checked_out(&self) -> bool {
        self.previous.state() == StayState::Open && self.current.state() == StayState::Closed
    }
}
