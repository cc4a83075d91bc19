use crate::card::deal_cards;
use crate::error::PokerError;
use crate::state::*;
use rand::Rng;
use std::collections::HashMap;

// --- 牌局系列 ---

/// 从 `start_idx`（含）起顺时针找到下一个 ACTIVE 座位
fn next_active_idx(table: &TableMetadata, start_idx: usize) -> Result<usize, PokerError> {
    let max_slots = table.slots.len();
    for offset in 0..max_slots {
        let idx = (start_idx + offset) % max_slots;
        if table.slots[idx].slot_status == SlotStatus::Active {
            return Ok(idx);
        }
    }
    Err(PokerError::InvariantViolation("没有任何 ACTIVE 座位".into()))
}

impl PokerGames {
    pub fn new(small_blind: u32, init_token: u32) -> PokerGames {
        PokerGames {
            metadata: GameMetadata {
                small_blind,
                init_token,
                button_idx: 0,
                remainder_policy: RemainderPolicy::default(),
            },
            games: Vec::new(),
            players: HashMap::new(),
        }
    }

    /// 当前一局（最近追加的一局）
    pub fn current_game(&self) -> Option<&Game> {
        self.games.last()
    }

    pub fn current_game_mut(&mut self) -> Option<&mut Game> {
        self.games.last_mut()
    }

    /// 开始新的一局
    ///
    /// 要求上一局（若有）已经结束，且至少有两个 ACTIVE 座位。
    /// 首局为所有就座玩家（含观战位）注入初始筹码，之后只为新入座的
    /// ACTIVE 玩家补发。随后抽牌、轮转庄家、冻结桌面快照、下大小盲注，
    /// 并确定第一个行动的玩家。盲注直接修改状态，不产生动作日志。
    pub fn start_game<R: Rng + ?Sized>(
        &mut self,
        table: &TableMetadata,
        rng: &mut R,
    ) -> Result<(), PokerError> {
        if let Some(game) = self.games.last() {
            if game.game_status != GameStatus::Over {
                return Err(PokerError::InvalidTransition("上一局还没有结束".into()));
            }
        }
        let active_players = table.active_players();
        if active_players.len() < 2 {
            return Err(PokerError::InvalidTransition(
                "至少需要两名入座玩家才能开局".into(),
            ));
        }

        // 注入筹码
        if self.games.is_empty() {
            for player_id in table.seated_players() {
                self.players
                    .insert(player_id, PlayerTokens::new(player_id, self.metadata.init_token));
            }
        } else {
            for player_id in &active_players {
                self.players
                    .entry(*player_id)
                    .or_insert_with(|| PlayerTokens::new(*player_id, self.metadata.init_token));
            }
        }

        // 1. 公共牌 5 张加上每人 2 张底牌，一次性抽出
        let cards = deal_cards(5 + active_players.len() * 2, rng);

        // 2. 庄家轮转到下一个 ACTIVE 座位
        self.metadata.button_idx = next_active_idx(table, self.metadata.button_idx + 1)?;

        // 3. 冻结桌面与配置快照，之后的座位变动不影响本局
        let mut game = Game {
            game_id: self.games.len() as u32,
            table_metadata: table.clone(),
            metadata: self.metadata.clone(),
            table_cards: cards[0..5]
                .try_into()
                .map_err(|_| PokerError::InvariantViolation("公共牌数量不是5张".into()))?,
            player_states: HashMap::new(),
            next_player_id: None,
            actions: Vec::new(),
            pots: Vec::new(),
            stage: GameStage::PreFlop,
            game_status: GameStatus::Playing,
        };

        // 4. 按座位顺序构造玩家状态，余额取自持久筹码
        for (idx, player_id) in active_players.iter().enumerate() {
            let tokens = self.players.get(player_id).ok_or_else(|| {
                PokerError::InvariantViolation(format!("玩家 {player_id} 没有筹码记录"))
            })?;
            game.player_states.insert(
                *player_id,
                PlayerGameState::new(
                    *player_id,
                    [cards[5 + idx * 2], cards[6 + idx * 2]],
                    tokens.amount_available,
                ),
            );
        }

        // 5. 下大小盲注，上限是各自的剩余筹码
        let small_blind = game.metadata.small_blind;
        let small_blind_idx = game.next_betting_idx(game.metadata.button_idx, false)?;
        post_blind(&mut game, small_blind_idx, small_blind)?;
        let big_blind_idx = game.next_betting_idx(small_blind_idx, false)?;
        post_blind(&mut game, big_blind_idx, small_blind * 2)?;

        // 6. 确定第一个行动者；盲注就可能让所有人全下，此时直接摊牌
        if game.should_show_hand() {
            game.advance_stage(Some(GameStage::ShowHand))?;
        } else {
            let first_idx = game.next_betting_idx(big_blind_idx, true)?;
            game.next_player_id = game.table_metadata.slots[first_idx].player_id;
        }

        self.games.push(game);
        if self
            .current_game()
            .is_some_and(|g| g.game_status == GameStatus::Over)
        {
            self.settle_current();
        }
        Ok(())
    }

    /// 处理玩家动作；本局结束时把输赢折入持久余额
    pub fn handle_player_action(
        &mut self,
        player_id: PlayerId,
        action_type: ActionType,
        amount: u32,
    ) -> Result<(), PokerError> {
        let game = self
            .games
            .last_mut()
            .ok_or_else(|| PokerError::InvalidTransition("还没有开始任何一局".into()))?;
        game.apply_action(player_id, action_type, amount)?;
        if game.game_status == GameStatus::Over {
            self.settle_current();
        }
        Ok(())
    }

    /// 一局结束后的结算：每人 `delta = 赢得奖池 - 累计下注`
    /// 按冻结座位表的顺序结算，保证变更日志的顺序稳定。
    fn settle_current(&mut self) {
        let Some(game) = self.games.last() else { return };
        let game_id = game.game_id;
        let deltas: Vec<(PlayerId, i64)> = game
            .table_metadata
            .active_players()
            .into_iter()
            .filter_map(|player_id| {
                let state = game.player_states.get(&player_id)?;
                Some((
                    player_id,
                    state.pot_won as i64 - state.total_betting as i64,
                ))
            })
            .collect();

        for (player_id, delta) in deltas {
            if let Some(tokens) = self.players.get_mut(&player_id) {
                tokens.apply_change(delta, game_id);
            }
        }
    }
}

/// 下一笔盲注，上限为玩家剩余筹码；筹码为零时什么都不投
fn post_blind(game: &mut Game, slot_idx: usize, blind: u32) -> Result<(), PokerError> {
    let player_id = game.table_metadata.slots[slot_idx]
        .player_id
        .ok_or_else(|| PokerError::InvariantViolation("盲注座位上没有玩家".into()))?;
    let state = game
        .player_states
        .get_mut(&player_id)
        .ok_or_else(|| PokerError::InvariantViolation(format!("玩家 {player_id} 不在本局中")))?;
    let amount = blind.min(state.amount_available);
    if amount > 0 {
        state.bet(amount);
    }
    Ok(())
}

// --- 单元测试 ---
