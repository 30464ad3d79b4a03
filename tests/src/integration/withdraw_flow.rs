//! # Withdraw Flows
//!
//! Shares burn at request acceptance; confirmed failures re-mint exactly.

#[cfg(test)]
mod tests {
    use crate::harness::{relay_identity, TestNet, ALICE, OPERATOR, USDC};
    use shared_types::InstructionStatus;
    use std::sync::Arc;
    use sv_02_vault_gateway::MockVault;
    use sv_03_share_ledger::{DepositEntry, LedgerApi, WithdrawEntry};

    /// Deposit 1000 for ALICE into vault 1 on domain 2 and confirm it.
    async fn seeded_net() -> (TestNet, Arc<MockVault>) {
        let net = TestNet::new(&[1, 2]);
        let vault = net.install_vault(2, 1);
        net.node(1)
            .ledger
            .request_deposit(
                ALICE,
                vec![DepositEntry {
                    vault_id: 1,
                    asset: USDC,
                    amount: 1_000,
                    slippage_bps: 100,
                }],
                2,
            )
            .await
            .unwrap();
        net.pump().await;
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        (net, vault)
    }

    fn withdraw(shares: u128) -> WithdrawEntry {
        WithdrawEntry {
            vault_id: 1,
            shares,
            slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn test_cross_domain_withdraw_round_trip() {
        let (net, vault) = seeded_net().await;

        let id = net
            .node(1)
            .ledger
            .request_withdraw(ALICE, vec![withdraw(1_000)])
            .await
            .unwrap();

        // Burned at acceptance, before the destination has seen anything.
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
        assert_eq!(vault.total_assets(), 1_000);

        net.pump().await;

        assert_eq!(vault.total_assets(), 0);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Executed)
        );
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
    }

    #[tokio::test]
    async fn test_illiquid_withdraw_restores_balance_on_forced_failure() {
        let (net, vault) = seeded_net().await;
        vault.set_liquidity(0);

        let id = net
            .node(1)
            .ledger
            .request_withdraw(ALICE, vec![withdraw(1_000)])
            .await
            .unwrap();
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);

        net.pump().await;

        // Execution failed on the destination; shares stay burned until the
        // failure is confirmed back.
        assert!(net
            .node(2)
            .relay
            .failed_message(1, relay_identity(1), 2)
            .is_some());
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Pending)
        );

        // Abandon the delivery; the failure acknowledgement triggers the
        // rollback on the source ledger.
        net.node(2)
            .relay
            .force_resume_receive(&OPERATOR, 1, relay_identity(1))
            .await
            .unwrap();
        net.pump().await;

        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Failed)
        );
        // Vault state never moved.
        assert_eq!(vault.total_assets(), 1_000);
    }

    #[tokio::test]
    async fn test_failed_withdraw_retry_succeeds_after_liquidity_returns() {
        let (net, vault) = seeded_net().await;
        vault.set_liquidity(0);

        let id = net
            .node(1)
            .ledger
            .request_withdraw(ALICE, vec![withdraw(1_000)])
            .await
            .unwrap();
        net.pump().await;
        assert!(net
            .node(2)
            .relay
            .failed_message(1, relay_identity(1), 2)
            .is_some());

        // Liquidity comes back; the stored payload replays cleanly.
        vault.set_liquidity(1_000);
        net.node(2)
            .relay
            .retry(&OPERATOR, 1, relay_identity(1), 2)
            .await
            .unwrap();
        net.pump().await;

        assert_eq!(vault.total_assets(), 0);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Executed)
        );
        // Shares stay burned on a confirmed success.
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
    }

    #[tokio::test]
    async fn test_second_withdraw_fails_while_first_in_flight() {
        let (net, _vault) = seeded_net().await;

        net.node(1)
            .ledger
            .request_withdraw(ALICE, vec![withdraw(1_000)])
            .await
            .unwrap();
        // First withdraw is unconfirmed; its burn already linearized.
        let result = net
            .node(1)
            .ledger
            .request_withdraw(ALICE, vec![withdraw(1_000)])
            .await;
        assert!(result.is_err());

        net.pump().await;
        // Only the first withdraw drained the vault.
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
    }
}
