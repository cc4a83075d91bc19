use crate::error::PokerError;
use crate::state::*;

// --- 单局状态机 ---

impl Game {
    /// 全场最高的累计下注额（包含已弃牌玩家）
    pub(crate) fn max_total_betting(&self) -> u32 {
        self.player_states
            .values()
            .map(|p| p.total_betting)
            .max()
            .unwrap_or(0)
    }

    /// 玩家当前需要跟上的最低下注额
    /// `min_bet = min(剩余筹码, 全场最高累计下注 - 自己的累计下注)`
    pub fn player_min_bet(&self, player_id: &PlayerId) -> Option<u32> {
        let state = self.player_states.get(player_id)?;
        Some(
            state
                .amount_available
                .min(self.max_total_betting() - state.total_betting),
        )
    }

    fn state_mut(&mut self, player_id: &PlayerId) -> Result<&mut PlayerGameState, PokerError> {
        self.player_states
            .get_mut(player_id)
            .ok_or_else(|| PokerError::InvariantViolation(format!("玩家 {player_id} 不在本局中")))
    }

    /// 玩家在冻结座位表中的索引
    pub fn player_slot_idx(&self, player_id: &PlayerId) -> Option<usize> {
        self.table_metadata
            .slots
            .iter()
            .position(|s| s.player_id == Some(*player_id))
    }

    /// 仍未弃牌的玩家，按座位顺序、从庄家下一位数起
    /// 摊牌分池时的赢家排序和余数补发都依赖这个顺序。
    pub(crate) fn betting_players(&self) -> Vec<PlayerId> {
        let max_slots = self.table_metadata.slots.len();
        let mut res = Vec::new();
        for offset in 1..=max_slots {
            let slot = &self.table_metadata.slots[(self.metadata.button_idx + offset) % max_slots];
            if let Some(player_id) = slot.player_id {
                if let Some(state) = self.player_states.get(&player_id) {
                    if state.player_status == PlayerStatus::Betting {
                        res.push(player_id);
                    }
                }
            }
        }
        res
    }

    /// 从 `current_idx` 顺时针找下一个可下注的座位
    ///
    /// 跳过空位、观战位、不在本局中的玩家和已弃牌玩家；
    /// `require_chips` 为 true 时同时跳过已经全下（筹码为零）的玩家。
    /// 扫描不包含起点自身，找不到时返回 `InvariantViolation` ——
    /// 终局判定应当先于此分支命中。
    pub(crate) fn next_betting_idx(
        &self,
        current_idx: usize,
        require_chips: bool,
    ) -> Result<usize, PokerError> {
        let max_slots = self.table_metadata.slots.len();
        let mut next_idx = (current_idx + 1) % max_slots;
        while next_idx != current_idx {
            let slot = &self.table_metadata.slots[next_idx];
            if slot.slot_status == SlotStatus::Active {
                if let Some(player_id) = slot.player_id {
                    if let Some(state) = self.player_states.get(&player_id) {
                        if state.player_status == PlayerStatus::Betting
                            && (!require_chips || state.amount_available > 0)
                        {
                            return Ok(next_idx);
                        }
                    }
                }
            }
            next_idx = (next_idx + 1) % max_slots;
        }
        Err(PokerError::InvariantViolation(
            "找不到下一个可下注的座位".into(),
        ))
    }

    /// 处理单个玩家的动作
    ///
    /// 这是状态机的核心驱动函数。先做全部合法性校验，全部通过后才开始
    /// 修改状态，所以任何错误返回都不会留下半成品。
    /// 动作生效后按优先级判定：只剩一人 -> 弃牌终局；下注对齐且无人可再
    /// 行动 -> 直接摊牌；本阶段完成 -> 推进阶段；否则轮转到下一个玩家。
    pub fn apply_action(
        &mut self,
        player_id: PlayerId,
        action_type: ActionType,
        amount: u32,
    ) -> Result<(), PokerError> {
        if self.game_status != GameStatus::Playing {
            return Err(PokerError::InvalidTransition("本局不在进行中".into()));
        }
        if self.next_player_id != Some(player_id) {
            return Err(PokerError::InvalidTransition(format!(
                "还没轮到玩家 {player_id} 行动"
            )));
        }

        let min_bet = self
            .player_min_bet(&player_id)
            .ok_or_else(|| PokerError::InvariantViolation(format!("玩家 {player_id} 不在本局中")))?;

        // 1. 校验
        match action_type {
            ActionType::Fold => {
                if min_bet == 0 {
                    return Err(PokerError::InvalidTransition(
                        "无需跟注时不能弃牌，应该过牌".into(),
                    ));
                }
            }
            ActionType::Check => {
                if min_bet > 0 {
                    return Err(PokerError::InvalidTransition(format!(
                        "还需跟注 {min_bet}，不能过牌"
                    )));
                }
            }
            ActionType::Bet => {
                let available = self.state_mut(&player_id)?.amount_available;
                if amount == 0 || amount < min_bet {
                    return Err(PokerError::InvalidTransition(format!(
                        "下注额 {amount} 低于最低跟注额 {min_bet}"
                    )));
                }
                if amount > available {
                    return Err(PokerError::InvalidTransition(format!(
                        "下注额 {amount} 超过剩余筹码 {available}"
                    )));
                }
            }
        }

        // 2. 生效
        match action_type {
            ActionType::Fold => self.state_mut(&player_id)?.fold(),
            ActionType::Check => {}
            ActionType::Bet => self.state_mut(&player_id)?.bet(amount),
        }

        // 3. 记录动作日志
        self.actions.push(Action {
            player_id,
            stage: self.stage,
            action_type,
            amount_bet: if action_type == ActionType::Bet { amount } else { 0 },
        });

        // 4. 判定下一步
        if self.is_folding() {
            self.handle_fold()
        } else if self.should_show_hand() {
            self.advance_stage(Some(GameStage::ShowHand))
        } else if self.is_stage_complete() {
            self.advance_stage(None)
        } else {
            let current_idx = self.player_slot_idx(&player_id).ok_or_else(|| {
                PokerError::InvariantViolation(format!("玩家 {player_id} 不在座位表中"))
            })?;
            let next_idx = self.next_betting_idx(current_idx, true)?;
            self.next_player_id = self.table_metadata.slots[next_idx].player_id;
            Ok(())
        }
    }

    /// 是否只剩一名玩家未弃牌
    fn is_folding(&self) -> bool {
        self.betting_players().len() == 1
    }

    /// 是否应直接进入摊牌：
    /// 所有未弃牌玩家的下注已对齐（或已全下），且最多一人还有筹码可行动
    pub(crate) fn should_show_hand(&self) -> bool {
        let max_total = self.max_total_betting();
        let mut with_chips = 0;
        for player_id in self.betting_players() {
            let state = &self.player_states[&player_id];
            if state.amount_available > 0 {
                if state.total_betting != max_total {
                    return false;
                }
                with_chips += 1;
            }
        }
        with_chips <= 1
    }

    /// 当前阶段是否结束：
    /// 每个还有筹码的未弃牌玩家都在本阶段行动过，且下注已对齐；
    /// 已全下的玩家无法再行动，不参与判定
    fn is_stage_complete(&self) -> bool {
        let max_total = self.max_total_betting();
        for player_id in self.betting_players() {
            let state = &self.player_states[&player_id];
            if state.amount_available == 0 {
                continue;
            }
            if state.total_betting != max_total {
                return false;
            }
            let acted = self
                .actions
                .iter()
                .any(|a| a.stage == self.stage && a.player_id == player_id);
            if !acted {
                return false;
            }
        }
        true
    }

    /// 结束当前下注轮，推进到下一阶段
    ///
    /// 清空各玩家本阶段的下注；进入 SHOW_HAND 时立即摊牌结算，
    /// 否则由庄家下家第一个可行动的玩家开始新一轮。
    pub(crate) fn advance_stage(&mut self, next_stage: Option<GameStage>) -> Result<(), PokerError> {
        for state in self.player_states.values_mut() {
            state.amount_betting = 0;
        }
        self.stage = next_stage.unwrap_or_else(|| self.stage.next());

        if self.stage == GameStage::ShowHand {
            self.next_player_id = None;
            self.show_hand()
        } else {
            let first_idx = self.next_betting_idx(self.metadata.button_idx, true)?;
            self.next_player_id = self.table_metadata.slots[first_idx].player_id;
            Ok(())
        }
    }
}

// --- 单元测试 ---
