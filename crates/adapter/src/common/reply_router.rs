use domain::Reply;
use matrix_sdk::ruma::{OwnedRoomId, OwnedUserId, RoomId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::warn;

const REPLY_BUFFER: usize = 8;

// 活跃会话注册表：每个用户同时只允许一个表单会话；
// 该用户在会话房间里的下一条消息优先投递给持有槽位的会话
#[derive(Clone)]
pub struct ReplyRouter {
    inner: Arc<Mutex<HashMap<OwnedUserId, ActiveSession>>>,
}

struct ActiveSession {
    room: OwnedRoomId,
    tx: mpsc::Sender<Reply>,
}

impl ReplyRouter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 占用会话槽；该用户已有进行中的会话时返回 None
    pub fn claim(
        &self,
        room: &RoomId,
        user: &UserId,
    ) -> Option<(SessionClaim, mpsc::Receiver<Reply>)> {
        let mut map = self.inner.lock().unwrap();
        if map.contains_key(user) {
            return None;
        }
        let (tx, rx) = mpsc::channel(REPLY_BUFFER);
        map.insert(
            user.to_owned(),
            ActiveSession {
                room: room.to_owned(),
                tx,
            },
        );
        Some((
            SessionClaim {
                router: self.clone(),
                user: user.to_owned(),
            },
            rx,
        ))
    }

    /// 把消息交给活跃会话；用户没有会话或消息不在会话房间时返回 false，
    /// 调用方按命令处理
    pub fn deliver(&self, room: &RoomId, user: &UserId, reply: Reply) -> bool {
        let tx = {
            let map = self.inner.lock().unwrap();
            match map.get(user) {
                Some(session) if session.room == room => Some(session.tx.clone()),
                _ => None,
            }
        };
        match tx {
            Some(tx) => {
                if tx.try_send(reply).is_err() {
                    warn!("Reply buffer full for {} in {}, message dropped", user, room);
                }
                true
            }
            None => false,
        }
    }

    fn release(&self, user: &UserId) {
        self.inner.lock().unwrap().remove(user);
    }
}

// 槽位随 claim 的生命周期释放，任何退出路径都不会泄漏
pub struct SessionClaim {
    router: ReplyRouter,
    user: OwnedUserId,
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        self.router.release(&self.user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> OwnedRoomId {
        RoomId::parse("!room:example.org").unwrap()
    }

    fn alice() -> OwnedUserId {
        UserId::parse("@alice:example.org").unwrap()
    }

    fn reply(s: &str) -> Reply {
        Reply {
            text: s.to_string(),
            attachments: vec![],
        }
    }

    #[test]
    fn second_claim_for_same_user_is_rejected() {
        let router = ReplyRouter::new();
        let first = router.claim(&room(), &alice());
        assert!(first.is_some());
        assert!(router.claim(&room(), &alice()).is_none());

        // 换一个房间也一样：会话唯一性按用户算
        let other_room = RoomId::parse("!other:example.org").unwrap();
        assert!(router.claim(&other_room, &alice()).is_none());
    }

    #[test]
    fn delivery_reaches_the_claimed_session() {
        let router = ReplyRouter::new();
        let (_claim, mut rx) = router.claim(&room(), &alice()).unwrap();

        assert!(router.deliver(&room(), &alice(), reply("Dracula")));
        assert_eq!(rx.try_recv().unwrap(), reply("Dracula"));

        // 其他用户的消息不被会话消费
        let bob = UserId::parse("@bob:example.org").unwrap();
        assert!(!router.deliver(&room(), &bob, reply("hello")));
    }

    #[test]
    fn messages_in_other_rooms_are_not_consumed() {
        let router = ReplyRouter::new();
        let (_claim, mut rx) = router.claim(&room(), &alice()).unwrap();

        let other_room = RoomId::parse("!other:example.org").unwrap();
        assert!(!router.deliver(&other_room, &alice(), reply("!curator add")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_the_claim_frees_the_slot() {
        let router = ReplyRouter::new();
        {
            let _claimed = router.claim(&room(), &alice()).unwrap();
            assert!(router.claim(&room(), &alice()).is_none());
        }
        assert!(router.claim(&room(), &alice()).is_some());
    }
}
