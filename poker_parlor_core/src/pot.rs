use crate::error::PokerError;
use crate::hand::{find_best_hand, Hand};
use crate::state::*;
use std::collections::HashMap;

// --- 终局分池 ---

impl Game {
    /// 弃牌终局：只剩一名玩家未弃牌，全部下注归其所有
    /// 其余人（包括弃牌者）投入的筹码全部进入这份唯一的奖池。
    pub(crate) fn handle_fold(&mut self) -> Result<(), PokerError> {
        let betting = self.betting_players();
        let winner = match betting.as_slice() {
            [winner] => *winner,
            _ => {
                return Err(PokerError::InvariantViolation(
                    "弃牌终局时未弃牌玩家应该恰好一人".into(),
                ));
            }
        };

        let amount: u32 = self.player_states.values().map(|s| s.total_betting).sum();
        if let Some(state) = self.player_states.get_mut(&winner) {
            state.pot_won += amount;
        }
        self.pots.push(Pot {
            amount,
            winner_ids: vec![winner],
        });
        self.next_player_id = None;
        self.game_status = GameStatus::Over;
        Ok(())
    }

    /// 摊牌结算
    ///
    /// 1. 评估所有未弃牌玩家的最佳牌力，按牌力分档打分，最优档分数最高；
    /// 2. 将未弃牌玩家的累计下注额去重后从小到大作为分池层级；
    /// 3. 每一层的奖池由所有玩家（含弃牌者）在该层区间内的投入组成，
    ///    由下注达到该层、且分数最高的未弃牌玩家平分；
    /// 4. 平分除不尽时按 [`RemainderPolicy`] 处理余数。
    ///
    /// 赢家列表按座位顺序（从庄家下家数起）记录。
    pub(crate) fn show_hand(&mut self) -> Result<(), PokerError> {
        let contenders = self.betting_players();
        if contenders.is_empty() {
            return Err(PokerError::InvariantViolation(
                "摊牌时没有未弃牌的玩家".into(),
            ));
        }

        // 1. 评估与分档
        let hands: Vec<(PlayerId, Hand)> = contenders
            .iter()
            .map(|player_id| {
                let state = &self.player_states[player_id];
                (*player_id, find_best_hand(&state.cards, &self.table_cards))
            })
            .collect();

        let mut tiers: Vec<Hand> = hands.iter().map(|(_, h)| h.clone()).collect();
        tiers.sort_by(|a, b| b.cmp(a));
        tiers.dedup();

        // 分数 = 档数 - 档序，牌力相同的玩家分数相同
        let scores: HashMap<PlayerId, usize> = hands
            .iter()
            .map(|(player_id, hand)| {
                let rank_idx = tiers.iter().position(|t| t == hand).unwrap_or(0);
                (*player_id, tiers.len() - rank_idx)
            })
            .collect();

        // 2. 分池层级
        let mut levels: Vec<u32> = contenders
            .iter()
            .map(|player_id| self.player_states[player_id].total_betting)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        // 3. 逐层切分
        let mut prev_level = 0u32;
        for level in levels {
            let amount: u32 = self
                .player_states
                .values()
                .map(|s| s.total_betting.min(level).saturating_sub(prev_level))
                .sum();
            prev_level = level;
            if amount == 0 {
                continue;
            }

            let eligible: Vec<PlayerId> = contenders
                .iter()
                .filter(|player_id| self.player_states[*player_id].total_betting >= level)
                .copied()
                .collect();
            let best_score = eligible
                .iter()
                .map(|player_id| scores[player_id])
                .max()
                .ok_or_else(|| {
                    PokerError::InvariantViolation("分池层级没有可参与的玩家".into())
                })?;
            let winners: Vec<PlayerId> = eligible
                .into_iter()
                .filter(|player_id| scores[player_id] == best_score)
                .collect();

            // 4. 平分与余数
            let share = amount / winners.len() as u32;
            let remainder = amount % winners.len() as u32;
            for (idx, winner) in winners.iter().enumerate() {
                let mut won = share;
                if self.metadata.remainder_policy == RemainderPolicy::SeatOrder
                    && (idx as u32) < remainder
                {
                    won += 1;
                }
                if let Some(state) = self.player_states.get_mut(winner) {
                    state.pot_won += won;
                }
            }
            self.pots.push(Pot {
                amount,
                winner_ids: winners,
            });
        }

        self.next_player_id = None;
        self.game_status = GameStatus::Over;
        Ok(())
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardColor::*};
    use crate::game::tests::setup_test_game;

    // 辅助函数：直接摆好公共牌和底牌再摊牌
    fn set_cards(game: &mut Game, player_id: &PlayerId, c1: Card, c2: Card) {
        game.player_states.get_mut(player_id).unwrap().cards = [c1, c2];
    }

    fn board(game: &mut Game, cards: [Card; 5]) {
        game.table_cards = cards;
    }

    fn card(color: crate::card::CardColor, number: u8) -> Card {
        Card::from_parts(color, number)
    }

    #[test]
    fn test_showdown_single_winner_takes_all() {
        let (mut game, p) = setup_test_game(&[100, 100], 5);
        board(&mut game, [
            card(Spade, 2),
            card(Heart, 7),
            card(Diamond, 9),
            card(Club, 12),
            card(Spade, 5),
        ]);
        set_cards(&mut game, &p[0], card(Spade, 12), card(Heart, 12)); // 三条 Q
        set_cards(&mut game, &p[1], card(Spade, 3), card(Heart, 4)); // 高牌

        // 小盲补齐，大盲过牌后继续到摊牌
        game.apply_action(p[0], ActionType::Bet, 5).unwrap();
        game.apply_action(p[1], ActionType::Check, 0).unwrap();
        for _ in 0..3 {
            game.apply_action(p[0], ActionType::Check, 0).unwrap();
            game.apply_action(p[1], ActionType::Check, 0).unwrap();
        }

        assert_eq!(game.game_status, GameStatus::Over);
        assert_eq!(game.pots.len(), 1);
        assert_eq!(game.pots[0].amount, 20);
        assert_eq!(game.pots[0].winner_ids, vec![p[0]]);
        assert_eq!(game.player_states[&p[0]].pot_won, 20);
        assert_eq!(game.player_states[&p[1]].pot_won, 0);
    }

    #[test]
    fn test_side_pot_with_short_all_in() {
        // A 只有 50 全下；B、C 各 200 跟到底。
        // 50 层的主池三人有份，超出部分只在 B、C 之间争夺。
        let (mut game, p) = setup_test_game(&[50, 200, 200], 5);
        board(&mut game, [
            card(Spade, 2),
            card(Heart, 7),
            card(Diamond, 9),
            card(Club, 12),
            card(Spade, 5),
        ]);
        set_cards(&mut game, &p[0], card(Club, 2), card(Heart, 3)); // 对 2
        set_cards(&mut game, &p[1], card(Spade, 12), card(Heart, 12)); // 三条 Q，最大
        set_cards(&mut game, &p[2], card(Diamond, 7), card(Club, 8)); // 对 7

        game.apply_action(p[2], ActionType::Bet, 200).unwrap(); // 全下 200
        game.apply_action(p[0], ActionType::Bet, 45).unwrap(); // 全下 50
        game.apply_action(p[1], ActionType::Bet, 190).unwrap(); // 跟注 200

        assert_eq!(game.game_status, GameStatus::Over);
        assert_eq!(game.pots.len(), 2);
        // 主池：50 * 3 = 150；边池：150 * 2 = 300
        assert_eq!(game.pots[0].amount, 150);
        assert_eq!(game.pots[1].amount, 300);
        // B 的三条 Q 两份都赢
        assert_eq!(game.pots[0].winner_ids, vec![p[1]]);
        assert_eq!(game.pots[1].winner_ids, vec![p[1]]);
        assert_eq!(game.player_states[&p[1]].pot_won, 450);

        let total: u32 = game.player_states.values().map(|s| s.total_betting).sum();
        let pots: u32 = game.pots.iter().map(|pot| pot.amount).sum();
        assert_eq!(total, pots);
    }

    #[test]
    fn test_short_stack_wins_only_main_pot() {
        // 全下的 A 牌最大：A 只能赢 50 层的主池，边池归 B、C 中较大的 B
        let (mut game, p) = setup_test_game(&[50, 200, 200], 5);
        board(&mut game, [
            card(Spade, 2),
            card(Heart, 7),
            card(Diamond, 9),
            card(Club, 12),
            card(Spade, 5),
        ]);
        set_cards(&mut game, &p[0], card(Spade, 12), card(Heart, 12)); // 三条 Q，最大
        set_cards(&mut game, &p[1], card(Diamond, 7), card(Club, 8)); // 对 7
        set_cards(&mut game, &p[2], card(Club, 2), card(Heart, 3)); // 对 2

        game.apply_action(p[2], ActionType::Bet, 200).unwrap();
        game.apply_action(p[0], ActionType::Bet, 45).unwrap();
        game.apply_action(p[1], ActionType::Bet, 190).unwrap();

        assert_eq!(game.pots[0].amount, 150);
        assert_eq!(game.pots[0].winner_ids, vec![p[0]]);
        assert_eq!(game.pots[1].amount, 300);
        assert_eq!(game.pots[1].winner_ids, vec![p[1]]);
        assert_eq!(game.player_states[&p[0]].pot_won, 150);
        assert_eq!(game.player_states[&p[1]].pot_won, 300);
        assert_eq!(game.player_states[&p[2]].pot_won, 0);
    }

    // 辅助函数：凑出 25 的奇数池，p1 和 p2 打公共牌平手
    // 小盲 p0 弃牌留下 5，p1、p2 各投 10
    fn odd_split_game(policy: RemainderPolicy) -> (Game, Vec<PlayerId>) {
        let (mut game, p) = setup_test_game(&[100, 100, 100], 5);
        game.metadata.remainder_policy = policy;
        board(&mut game, [
            card(Spade, 10),
            card(Heart, 11),
            card(Diamond, 12),
            card(Club, 13),
            card(Spade, 1),
        ]);
        // 公共牌就是最大顺子，两名存活玩家都打公共牌
        set_cards(&mut game, &p[1], card(Club, 2), card(Heart, 3));
        set_cards(&mut game, &p[2], card(Diamond, 2), card(Spade, 3));

        game.apply_action(p[2], ActionType::Bet, 10).unwrap();
        game.apply_action(p[0], ActionType::Fold, 0).unwrap();
        game.apply_action(p[1], ActionType::Check, 0).unwrap();
        for _ in 0..3 {
            game.apply_action(p[1], ActionType::Check, 0).unwrap();
            game.apply_action(p[2], ActionType::Check, 0).unwrap();
        }
        assert_eq!(game.game_status, GameStatus::Over);
        (game, p)
    }

    #[test]
    fn test_split_pot_remainder_by_seat_order() {
        let (game, p) = odd_split_game(RemainderPolicy::SeatOrder);

        // 25 平分给两人：座位顺序靠前的 p1 多拿 1，筹码一个不丢
        let won1 = game.player_states[&p[1]].pot_won;
        let won2 = game.player_states[&p[2]].pot_won;
        assert_eq!(won1, 13);
        assert_eq!(won2, 12);
        assert_eq!(won1 + won2, game.pots.iter().map(|pot| pot.amount).sum::<u32>());
    }

    #[test]
    fn test_split_pot_remainder_discard_policy() {
        let (game, p) = odd_split_game(RemainderPolicy::Discard);

        // 截断策略：25 / 2 = 12，各拿 12，1 个筹码消失
        assert_eq!(game.player_states[&p[1]].pot_won, 12);
        assert_eq!(game.player_states[&p[2]].pot_won, 12);
        // 奖池账面仍记录全额，差额即缺陷暴露出来
        assert_eq!(game.pots.iter().map(|pot| pot.amount).sum::<u32>(), 25);
    }

    #[test]
    fn test_folded_player_money_stays_in_pot() {
        // 弃牌玩家投入的筹码归入对应层级的奖池
        let (mut game, p) = setup_test_game(&[100, 100, 100], 5);
        board(&mut game, [
            card(Spade, 2),
            card(Heart, 7),
            card(Diamond, 9),
            card(Club, 12),
            card(Spade, 5),
        ]);
        set_cards(&mut game, &p[0], card(Spade, 12), card(Heart, 12));
        set_cards(&mut game, &p[1], card(Diamond, 7), card(Club, 8));

        game.apply_action(p[2], ActionType::Bet, 30).unwrap();
        game.apply_action(p[0], ActionType::Bet, 25).unwrap();
        game.apply_action(p[1], ActionType::Bet, 20).unwrap();
        // 翻牌后 p2 弃牌，剩下两人过到摊牌
        game.apply_action(p[0], ActionType::Bet, 10).unwrap();
        game.apply_action(p[1], ActionType::Bet, 10).unwrap();
        game.apply_action(p[2], ActionType::Fold, 0).unwrap();
        for _ in 0..2 {
            game.apply_action(p[0], ActionType::Check, 0).unwrap();
            game.apply_action(p[1], ActionType::Check, 0).unwrap();
        }

        assert_eq!(game.game_status, GameStatus::Over);
        // p2 的 30 也在池里：30*3 + 10*2 = 110
        assert_eq!(game.pots.iter().map(|pot| pot.amount).sum::<u32>(), 110);
        assert_eq!(game.player_states[&p[0]].pot_won, 110);
    }
}
