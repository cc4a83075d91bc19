use poker_parlor_core::{GameType, PlayerId, PokerError, PokerGames, RoomId, Slot, SlotStatus, TableMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 一个房间的完整快照：座位表加上进行中的牌局系列
///
/// 房间整体作为一个值在存储层读写，核心规则只在内存副本上运算。
/// 谁有资格坐哪个座位由外部的入座流程决定，这里只写入占用结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    pub table_metadata: TableMetadata,
    pub poker_games: Option<PokerGames>,
}

impl Room {
    pub fn new(game_type: GameType, max_slots: u8) -> Room {
        Room {
            room_id: Uuid::new_v4(),
            table_metadata: TableMetadata::new(game_type, max_slots),
            poker_games: None,
        }
    }

    /// 把玩家写进一个空座位
    pub fn seat_player(&mut self, slot_idx: usize, player_id: PlayerId) -> Result<(), PokerError> {
        let slot = self
            .table_metadata
            .slots
            .get_mut(slot_idx)
            .ok_or_else(|| PokerError::InvalidTransition(format!("座位 {slot_idx} 不存在")))?;
        if slot.slot_status != SlotStatus::Empty {
            return Err(PokerError::InvalidTransition(format!(
                "座位 {slot_idx} 已被占用"
            )));
        }
        *slot = Slot::active(player_id);
        Ok(())
    }

    /// 清空一个座位
    /// 进行中的一局用的是冻结副本，离座不影响它
    pub fn clear_slot(&mut self, slot_idx: usize) -> Result<(), PokerError> {
        let slot = self
            .table_metadata
            .slots
            .get_mut(slot_idx)
            .ok_or_else(|| PokerError::InvalidTransition(format!("座位 {slot_idx} 不存在")))?;
        *slot = Slot::empty();
        Ok(())
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use poker_parlor_core::ActionType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seat_player_rejects_occupied() {
        let mut room = Room::new(GameType::Poker, 4);
        let a = PlayerId::new_v4();
        let b = PlayerId::new_v4();

        room.seat_player(1, a).unwrap();
        let err = room.seat_player(1, b).unwrap_err();
        assert!(matches!(err, PokerError::InvalidTransition(_)));
        assert_eq!(room.table_metadata.slots[1].player_id, Some(a));

        room.clear_slot(1).unwrap();
        room.seat_player(1, b).unwrap();
    }

    #[test]
    fn test_room_snapshot_round_trips_mid_hand() {
        // 打到一半的房间经过 JSON 编解码后必须一模一样
        let mut room = Room::new(GameType::Poker, 6);
        let players: Vec<PlayerId> = (0..3).map(|_| PlayerId::new_v4()).collect();
        for (idx, player_id) in players.iter().enumerate() {
            room.seat_player(idx, *player_id).unwrap();
        }

        let mut series = poker_parlor_core::PokerGames::new(5, 100);
        let mut rng = StdRng::seed_from_u64(11);
        series.start_game(&room.table_metadata, &mut rng).unwrap();
        // 留下一点动作日志再序列化
        let actor = series.current_game().unwrap().next_player_id.unwrap();
        series.handle_player_action(actor, ActionType::Bet, 10).unwrap();
        room.poker_games = Some(series);

        let encoded = serde_json::to_string(&room).unwrap();
        let decoded: Room = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, room);
    }
}
