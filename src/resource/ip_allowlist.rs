//! `scp_ip_allowlists` and `scp_ipv6_allowlists`: subnets allowed to reach a
//! stack feature.
//!
//! The resource owns a set of subnets on one feature. Updates are computed
//! as set differences and sent as separate add and remove calls; the
//! feature itself is never deleted. A feature the stack does not know, or a
//! 404, means the resource is gone in every phase.
//!
//! A read adopts the server's whole subnet list for the feature, including
//! subnets added outside this resource. A later delete removes every subnet
//! in state, so it also drops those out-of-band entries.

use super::{mark_gone, wait_failed};
use crate::context::AcsContext;
use crate::status::allowlist as refresh;
use acs::types::{IpVersion, Subnets};
use declarative::{AttrType, Attribute, Attributes, Diagnostic, Diagnostics, Resource, ResourceData, Schema};
use reconcile::sets::difference;
use reconcile::status::{PENDING_VERIFY_UPDATED, TARGET_CHANGE_SYNC, TARGET_UPDATED};
use reconcile::{Phase, WaitError, WaitSpec, defaults};
use std::net::IpAddr;

/// Features that can carry an allowlist.
pub const FEATURES: &[&str] = &["acs", "search-api", "hec", "s2s", "search-ui", "idm-ui", "idm-api"];

pub struct AllowlistResource {
    version: IpVersion,
}

impl AllowlistResource {
    pub const fn ipv4() -> Self {
        Self { version: IpVersion::V4 }
    }

    pub const fn ipv6() -> Self {
        Self { version: IpVersion::V6 }
    }

    fn kind(&self) -> &'static str {
        match self.version {
            IpVersion::V4 => "IP allowlist",
            IpVersion::V6 => "IPv6 allowlist",
        }
    }

    fn write_wait(&self, ctx: &AcsContext, phase: Phase) -> WaitSpec {
        ctx.write_wait(phase, TARGET_CHANGE_SYNC)
            .poll_interval(defaults::ALLOWLIST_POLL_INTERVAL)
    }

    /// Map a failed wait to diagnostics; a missing feature is not an error.
    fn failure(&self, data: &mut ResourceData, phase: Phase, err: &WaitError) -> Diagnostics {
        if err.kind(phase).is_gone() {
            mark_gone(self.kind(), data, err);
            return Diagnostics::new();
        }
        let feature = data.get_str("feature").unwrap_or(data.id()).to_string();
        wait_failed(self.kind(), &feature, phase, err)
    }

    fn check_subnet(&self, subnet: &str) -> Result<(), String> {
        let (addr, prefix) = subnet
            .split_once('/')
            .ok_or_else(|| format!("\"{subnet}\" is missing a prefix length"))?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| format!("\"{subnet}\" is not a valid address"))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| format!("\"{subnet}\" has an invalid prefix length"))?;
        let max = match (self.version, addr) {
            (IpVersion::V4, IpAddr::V4(_)) => 32,
            (IpVersion::V6, IpAddr::V6(_)) => 128,
            _ => return Err(format!("\"{subnet}\" is not an {} subnet", self.version)),
        };
        if prefix > max {
            return Err(format!("\"{subnet}\" has a prefix length above {max}"));
        }
        Ok(())
    }
}

impl Resource<AcsContext> for AllowlistResource {
    fn type_name(&self) -> &'static str {
        match self.version {
            IpVersion::V4 => "scp_ip_allowlists",
            IpVersion::V6 => "scp_ipv6_allowlists",
        }
    }

    fn schema(&self) -> Schema {
        let description = match self.version {
            IpVersion::V4 => "IPv4 subnets allowed to access a stack feature",
            IpVersion::V6 => "IPv6 subnets allowed to access a stack feature",
        };
        Schema::new(self.type_name(), description)
            .attribute(
                Attribute::required("feature", AttrType::String)
                    .force_new()
                    .describe("Feature the subnets apply to, e.g. search-api"),
            )
            .attribute(
                Attribute::required("subnets", AttrType::StringSet).describe("Subnets in CIDR notation"),
            )
    }

    fn validate(&self, config: &Attributes) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(feature) = config.get("feature").and_then(|v| v.as_str())
            && !FEATURES.contains(&feature)
        {
            diags.push(
                Diagnostic::error("Unsupported feature")
                    .with_detail(format!("expected one of {}, got \"{feature}\"", FEATURES.join(", ")))
                    .at("feature"),
            );
        }
        let subnets = config.get("subnets").and_then(|v| v.as_array());
        for subnet in subnets.into_iter().flatten().filter_map(|v| v.as_str()) {
            if let Err(detail) = self.check_subnet(subnet) {
                diags.push(Diagnostic::error("Invalid subnet").with_detail(detail).at("subnets"));
            }
        }
        diags
    }

    fn create(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let feature = data.get_str("feature").unwrap_or_default().to_string();
        let subnets = Subnets::new(data.get_set("subnets").unwrap_or_default());

        let spec = self.write_wait(ctx, Phase::Create);
        if let Err(err) = ctx.waiter.wait_for(&spec, || {
            refresh::add(&ctx.client, &ctx.stack, self.version, &feature, &subnets)
        }) {
            return self.failure(data, Phase::Create, &err);
        }

        data.set_id(&feature);
        self.read(ctx, data)
    }

    fn read(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let feature = data.id().to_string();
        let result = ctx.waiter.wait_for(&ctx.read_wait(), || {
            refresh::read(&ctx.client, &ctx.stack, self.version, &feature)
        });
        match result {
            Ok(server) => {
                data.set("feature", &feature);
                data.set("subnets", server.subnets);
                Diagnostics::new()
            }
            Err(err) => self.failure(data, Phase::Read, &err),
        }
    }

    fn update(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let feature = data.id().to_string();
        let (old, new) = data.get_set_change("subnets");
        let added = Subnets::new(difference(&new, &old));
        let removed = Subnets::new(difference(&old, &new));

        if !added.subnets.is_empty() {
            let spec = self.write_wait(ctx, Phase::Update);
            if let Err(err) = ctx.waiter.wait_for(&spec, || {
                refresh::add(&ctx.client, &ctx.stack, self.version, &feature, &added)
            }) {
                return self.failure(data, Phase::Update, &err);
            }
        }

        if !removed.subnets.is_empty() {
            let spec = self.write_wait(ctx, Phase::Update);
            if let Err(err) = ctx.waiter.wait_for(&spec, || {
                refresh::remove(&ctx.client, &ctx.stack, self.version, &feature, &removed)
            }) {
                return self.failure(data, Phase::Update, &err);
            }
        }

        if !added.subnets.is_empty() || !removed.subnets.is_empty() {
            let spec = ctx.poll_wait(Phase::Update, PENDING_VERIFY_UPDATED, TARGET_UPDATED);
            if let Err(err) = ctx.waiter.wait_for(&spec, || {
                refresh::verify_update(&ctx.client, &ctx.stack, self.version, &feature, &added, &removed)
            }) {
                return self.failure(data, Phase::Update, &err);
            }
        }

        self.read(ctx, data)
    }

    fn delete(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let feature = data.id().to_string();
        let subnets = Subnets::new(data.get_set("subnets").unwrap_or_default());

        if !subnets.subnets.is_empty() {
            let spec = self.write_wait(ctx, Phase::Delete);
            if let Err(err) = ctx.waiter.wait_for(&spec, || {
                refresh::remove(&ctx.client, &ctx.stack, self.version, &feature, &subnets)
            }) {
                return self.failure(data, Phase::Delete, &err);
            }
        }

        data.set_id("");
        Diagnostics::new()
    }
}
