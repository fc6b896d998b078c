use crate::cleanup::application::request::cleanup_plan::{
    CleanupCandidate, CleanupPlan, PlanPolicy, Risk,
};
use crate::core::domain::model::{Inventory, ResourceHandle};
use std::time::SystemTime;
use tracing::{debug, info};

/// Selects deletable snapshots from an inventory.
pub struct PlannerService {
    policy: PlanPolicy,
}

impl PlannerService {
    pub fn new(policy: PlanPolicy) -> Self {
        Self { policy }
    }

    /// Builds a plan of every snapshot that passes the policy, ordered by
    /// guest, then creation time, then name. Ages are measured against `now`.
    pub fn plan(&self, inventory: &Inventory, now: SystemTime) -> CleanupPlan {
        let mut candidates: Vec<CleanupCandidate> = inventory
            .snapshots()
            .filter(|(handle, _)| self.includes_resource(handle))
            .filter_map(|(handle, snapshot)| {
                let vmid = handle.vmid?;
                let age_days = snapshot.age_days(now);
                let (risk, reason) = Risk::assess(age_days);
                Some(CleanupCandidate {
                    resource_id: handle.id.clone(),
                    kind: handle.kind,
                    node: handle.node.clone(),
                    vmid,
                    label: handle.label(),
                    snapshot: snapshot.name.clone(),
                    created_at: snapshot.created_at,
                    age_days,
                    risk,
                    reason: reason.to_string(),
                })
            })
            .filter(|candidate| self.passes(candidate))
            .collect();

        candidates.sort_by(|a, b| {
            (a.kind, a.vmid, a.created_at, &a.snapshot).cmp(&(
                b.kind,
                b.vmid,
                b.created_at,
                &b.snapshot,
            ))
        });

        info!(
            node = %inventory.node,
            candidates = candidates.len(),
            low = candidates.iter().filter(|c| c.risk == Risk::Low).count(),
            "cleanup plan built"
        );

        CleanupPlan {
            node: inventory.node.clone(),
            generated_at: now,
            policy: self.policy.clone(),
            candidates,
        }
    }

    fn includes_resource(&self, handle: &ResourceHandle) -> bool {
        let resources = &self.policy.resources;
        resources.is_empty()
            || resources.iter().any(|wanted| {
                *wanted == handle.id || handle.vmid.is_some_and(|v| *wanted == v.to_string())
            })
    }

    fn passes(&self, candidate: &CleanupCandidate) -> bool {
        if candidate.risk > self.policy.max_risk {
            debug!(snapshot = %candidate.snapshot, risk = %candidate.risk, "above risk limit");
            return false;
        }
        match candidate.age_days {
            Some(days) => days >= self.policy.min_age_days,
            None => self.policy.min_age_days == 0,
        }
    }
}
