//! # Replay and Conservation
//!
//! Duplicate deliveries are no-ops and accounting stays conserved at every
//! quiescent point.

#[cfg(test)]
mod tests {
    use crate::harness::{relay_identity, TestNet, ALICE, BOB, OPERATOR, USDC};
    use sv_03_share_ledger::{DepositEntry, LedgerApi, WithdrawEntry};

    fn entry(amount: u128) -> DepositEntry {
        DepositEntry {
            vault_id: 1,
            asset: USDC,
            amount,
            slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn test_duplicate_request_delivery_executes_once() {
        let net = TestNet::new(&[1, 2]);
        let vault = net.install_vault(2, 1);

        net.node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1_000)], 2)
            .await
            .unwrap();

        // The transport redelivers the forward instruction.
        net.transport.duplicate_front();
        net.pump().await;

        // One execution, one acknowledgement, one mint.
        assert_eq!(vault.total_assets(), 1_000);
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
    }

    #[tokio::test]
    async fn test_duplicate_acknowledgement_leaves_balance_fixed() {
        let net = TestNet::new(&[1, 2]);
        net.install_vault(2, 1);

        net.node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1_000)], 2)
            .await
            .unwrap();

        // Deliver the forward leg; the acknowledgement is now queued.
        net.transport.deliver_next().await;
        assert_eq!(net.transport.pending(), 1);

        // The transport redelivers the acknowledgement.
        net.transport.duplicate_front();
        net.pump().await;

        // 1000, not 2000.
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
    }

    #[tokio::test]
    async fn test_conservation_at_quiescence() {
        let net = TestNet::new(&[1, 2]);
        let vault = net.install_vault(2, 1);

        // Two deposits, one successful withdraw, one forced-failed withdraw.
        net.node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1_000)], 2)
            .await
            .unwrap();
        net.node(1)
            .ledger
            .request_deposit(BOB, vec![entry(600)], 2)
            .await
            .unwrap();
        net.pump().await;

        net.node(1)
            .ledger
            .request_withdraw(
                ALICE,
                vec![WithdrawEntry {
                    vault_id: 1,
                    shares: 400,
                    slippage_bps: 100,
                }],
            )
            .await
            .unwrap();
        net.pump().await;

        vault.set_liquidity(0);
        net.node(1)
            .ledger
            .request_withdraw(
                BOB,
                vec![WithdrawEntry {
                    vault_id: 1,
                    shares: 600,
                    slippage_bps: 100,
                }],
            )
            .await
            .unwrap();
        net.pump().await;
        net.node(2)
            .relay
            .force_resume_receive(&OPERATOR, 1, relay_identity(1))
            .await
            .unwrap();
        net.pump().await;

        // Quiescent: issuance equals the sum of balances.
        let alice = net.node(1).ledger.balance_of(&ALICE, 1);
        let bob = net.node(1).ledger.balance_of(&BOB, 1);
        assert_eq!(alice, 600);
        assert_eq!(bob, 600);
        assert_eq!(net.node(1).ledger.total_issued(1), alice + bob);
        assert_eq!(net.transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_processed_reads_track_both_sides() {
        let net = TestNet::new(&[1, 2]);
        net.install_vault(2, 1);

        net.node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1_000)], 2)
            .await
            .unwrap();
        assert!(!net.node(2).relay.is_processed(1, relay_identity(1), 1));

        net.pump().await;

        assert!(net.node(2).relay.is_processed(1, relay_identity(1), 1));
        assert!(net.node(1).relay.is_processed(2, relay_identity(2), 1));
        assert_eq!(net.node(2).relay.next_inbound_nonce(1, relay_identity(1)), 2);
    }
}
