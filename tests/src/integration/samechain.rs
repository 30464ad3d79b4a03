//! # Same-Domain Flows
//!
//! When source and destination are the same domain, the relay delivers to
//! itself through the normal receive path; the whole round trip completes
//! synchronously inside the request call.

#[cfg(test)]
mod tests {
    use crate::harness::{TestNet, ALICE, USDC};
    use shared_types::InstructionStatus;
    use sv_03_share_ledger::{DepositEntry, LedgerApi, WithdrawEntry};

    #[tokio::test]
    async fn test_same_domain_deposit_confirms_synchronously() {
        let net = TestNet::new(&[1]);
        let vault = net.install_vault(1, 1);

        let id = net
            .node(1)
            .ledger
            .request_deposit(
                ALICE,
                vec![DepositEntry {
                    vault_id: 1,
                    asset: USDC,
                    amount: 1_000,
                    slippage_bps: 100,
                }],
                1,
            )
            .await
            .unwrap();

        // No transport leg: request and acknowledgement delivered locally.
        assert_eq!(net.transport.pending(), 0);
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Executed)
        );
        assert_eq!(vault.total_assets(), 1_000);
    }

    #[tokio::test]
    async fn test_same_domain_withdraw_round_trip() {
        let net = TestNet::new(&[1]);
        let vault = net.install_vault(1, 1);
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
                1,
            )
            .await
            .unwrap();

        let id = net
            .node(1)
            .ledger
            .request_withdraw(
                ALICE,
                vec![WithdrawEntry {
                    vault_id: 1,
                    shares: 1_000,
                    slippage_bps: 100,
                }],
            )
            .await
            .unwrap();

        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Executed)
        );
        assert_eq!(vault.total_assets(), 0);
    }
}
