//! # Deposit Flows
//!
//! Source ledger -> relay -> destination gateway -> vault, and the
//! acknowledgement trip back.

#[cfg(test)]
mod tests {
    use crate::harness::{relay_identity, TestNet, ADMIN, ALICE, OPERATOR, USDC};
    use shared_types::InstructionStatus;
    use sv_02_vault_gateway::GatewayApi;
    use sv_03_share_ledger::{DepositEntry, LedgerApi};

    fn entry(vault_id: u64, amount: u128) -> DepositEntry {
        DepositEntry {
            vault_id,
            asset: USDC,
            amount,
            slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn test_cross_domain_deposit_mints_confirmed_shares() {
        let net = TestNet::new(&[1, 2]);
        let vault = net.install_vault(2, 1);

        let id = net
            .node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1, 1_000)], 2)
            .await
            .unwrap();

        // Nothing minted while the instruction is in flight.
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 0);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Pending)
        );
        assert_eq!(net.node(1).bridge.custody_of(&USDC), 1_000);

        // Forward leg + acknowledgement leg.
        assert_eq!(net.pump().await, 2);

        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Executed)
        );
        assert_eq!(vault.total_assets(), 1_000);
        assert!(net.node(2).gateway.is_executed(1, id));
        assert!(net.node(2).relay.is_processed(1, relay_identity(1), 1));
    }

    #[tokio::test]
    async fn test_batched_deposit_across_two_vaults() {
        let net = TestNet::new(&[1, 2]);
        let vault_a = net.install_vault(2, 1);
        let vault_b = net.install_vault(2, 2);

        net.node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1, 1_000), entry(2, 2_500)], 2)
            .await
            .unwrap();
        net.pump().await;

        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 2), 2_500);
        assert_eq!(vault_a.total_assets(), 1_000);
        assert_eq!(vault_b.total_assets(), 2_500);
    }

    #[tokio::test]
    async fn test_unregistered_vault_recovers_via_retry() {
        let net = TestNet::new(&[1, 2]);
        // The vault is mapped on the source ledger but never registered on
        // the destination gateway.
        net.node(1)
            .ledger
            .set_vault_domain(&ADMIN, 1, 2)
            .unwrap();

        let id = net
            .node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1, 1_000)], 2)
            .await
            .unwrap();
        net.pump().await;

        // Execution failed on the destination; the payload is stored, no
        // acknowledgement went back.
        assert!(!net.node(2).relay.is_processed(1, relay_identity(1), 1));
        assert!(net
            .node(2)
            .relay
            .failed_message(1, relay_identity(1), 1)
            .is_some());
        assert_eq!(
            net.node(1).ledger.instruction_status(id),
            Some(InstructionStatus::Pending)
        );

        // Fix the registry, then retry the stored payload.
        let vault = net.install_vault(2, 1);
        net.node(2)
            .relay
            .retry(&OPERATOR, 1, relay_identity(1), 1)
            .await
            .unwrap();
        net.pump().await;

        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        assert_eq!(vault.total_assets(), 1_000);
        assert!(net.node(2).relay.is_processed(1, relay_identity(1), 1));
    }

    #[tokio::test]
    async fn test_two_requesters_account_separately() {
        let net = TestNet::new(&[1, 2]);
        net.install_vault(2, 1);

        net.node(1)
            .ledger
            .request_deposit(ALICE, vec![entry(1, 1_000)], 2)
            .await
            .unwrap();
        net.node(1)
            .ledger
            .request_deposit(crate::harness::BOB, vec![entry(1, 250)], 2)
            .await
            .unwrap();
        net.pump().await;

        assert_eq!(net.node(1).ledger.balance_of(&ALICE, 1), 1_000);
        assert_eq!(net.node(1).ledger.balance_of(&crate::harness::BOB, 1), 250);
        assert_eq!(net.node(1).ledger.total_issued(1), 1_250);
    }
}
