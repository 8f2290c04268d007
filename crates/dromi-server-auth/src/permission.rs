// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace permissions.
//!
//! A workspace member holds zero or more [`PermissionGrant`] rows. Each row names a
//! [`Resource`] kind, optionally one instance of it, and a [`PermissionFlags`]
//! bitmask. [`evaluate_permissions`] decides a request against a [`MemberSnapshot`]
//! of those rows without touching storage.
//!
//! # Evaluation
//!
//! ```text
//! no member (or owner required, member not owner) ─► denied, flags = []
//! member.is_owner                                 ─► granted, flags = all rows
//! otherwise, for every RequiredPermission:
//!     resource_id given?  instance row with flag ─► entry passes
//!     no resource_id, or fallback enabled:
//!                         workspace-wide row (resource_id = None) with flag ─► passes
//!     else                                        ─► entry fails
//! granted = all entries pass (an empty list passes)
//! ```
//!
//! Flags are tested with bitwise AND, so one row can grant several actions.
//! Duplicate rows for the same scope are OR'd: any matching row suffices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

use crate::MemberId;

// =============================================================================
// Flags
// =============================================================================

/// Bitmask of actions a grant allows.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionFlags(u32);

impl PermissionFlags {
	pub const NONE: Self = Self(0);
	pub const VIEW: Self = Self(1);
	pub const EDIT: Self = Self(2);
	pub const CREATE: Self = Self(4);
	pub const DELETE: Self = Self(8);
	pub const MANAGE: Self = Self(16);
	/// Every defined flag OR'd together (31).
	pub const ALL: Self = Self(31);

	const NAMED: [(Self, &'static str); 5] = [
		(Self::VIEW, "VIEW"),
		(Self::EDIT, "EDIT"),
		(Self::CREATE, "CREATE"),
		(Self::DELETE, "DELETE"),
		(Self::MANAGE, "MANAGE"),
	];

	/// Build from stored bits, keeping unknown bits as-is.
	pub const fn from_bits(bits: u32) -> Self {
		Self(bits)
	}

	pub const fn bits(self) -> u32 {
		self.0
	}

	/// True when any bit of `other` is set in `self`.
	pub const fn intersects(self, other: Self) -> bool {
		self.0 & other.0 != 0
	}

	/// True when every bit of `other` is set in `self`.
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// The individual named flags set in this mask.
	pub fn flags(self) -> Vec<PermissionFlags> {
		Self::NAMED
			.iter()
			.filter(|(flag, _)| self.intersects(*flag))
			.map(|(flag, _)| *flag)
			.collect()
	}
}

impl BitOr for PermissionFlags {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl BitOrAssign for PermissionFlags {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

impl BitAnd for PermissionFlags {
	type Output = Self;

	fn bitand(self, rhs: Self) -> Self {
		Self(self.0 & rhs.0)
	}
}

impl fmt::Debug for PermissionFlags {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_empty() {
			return f.write_str("NONE");
		}
		let names: Vec<&str> = Self::NAMED
			.iter()
			.filter(|(flag, _)| self.intersects(*flag))
			.map(|(_, name)| *name)
			.collect();
		f.write_str(&names.join(" | "))
	}
}

impl fmt::Display for PermissionFlags {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

// =============================================================================
// Resources
// =============================================================================

/// Kinds of resource a grant can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
	Workspace,
	Todo,
}

impl Resource {
	pub fn all() -> &'static [Resource] {
		&[Resource::Workspace, Resource::Todo]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Resource::Workspace => "WORKSPACE",
			Resource::Todo => "TODO",
		}
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Resource {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"WORKSPACE" => Ok(Resource::Workspace),
			"TODO" => Ok(Resource::Todo),
			other => Err(format!("unknown resource: {other}")),
		}
	}
}

// =============================================================================
// Grants and snapshots
// =============================================================================

/// One stored permission row, as seen by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
	pub resource: Resource,
	/// `None` grants across every instance of `resource` in the workspace.
	pub resource_id: Option<String>,
	pub flags: PermissionFlags,
}

impl PermissionGrant {
	pub fn workspace_wide(resource: Resource, flags: PermissionFlags) -> Self {
		Self {
			resource,
			resource_id: None,
			flags,
		}
	}

	pub fn instance(resource: Resource, resource_id: impl Into<String>, flags: PermissionFlags) -> Self {
		Self {
			resource,
			resource_id: Some(resource_id.into()),
			flags,
		}
	}
}

/// A member's ownership bit and every grant row, loaded once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
	pub member_id: MemberId,
	pub is_owner: bool,
	pub grants: Vec<PermissionGrant>,
}

impl MemberSnapshot {
	/// Whether a workspace-wide row for `resource` carries `flag`.
	pub fn has_workspace_wide(&self, resource: Resource, flag: PermissionFlags) -> bool {
		self
			.grants
			.iter()
			.any(|g| g.resource == resource && g.resource_id.is_none() && g.flags.intersects(flag))
	}

	/// Instance ids of `resource` that carry `flag` through an instance-scoped row.
	pub fn granted_instance_ids(&self, resource: Resource, flag: PermissionFlags) -> Vec<&str> {
		let mut ids: Vec<&str> = self
			.grants
			.iter()
			.filter(|g| g.resource == resource && g.flags.intersects(flag))
			.filter_map(|g| g.resource_id.as_deref())
			.collect();
		ids.sort_unstable();
		ids.dedup();
		ids
	}
}

/// One requirement of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPermission {
	pub resource: Resource,
	pub flag: PermissionFlags,
	pub resource_id: Option<String>,
	/// Allow a workspace-wide row to satisfy an instance-scoped requirement.
	pub check_workspace_permission: bool,
}

impl RequiredPermission {
	/// Require `flag` on `resource` workspace-wide.
	pub fn new(resource: Resource, flag: PermissionFlags) -> Self {
		Self {
			resource,
			flag,
			resource_id: None,
			check_workspace_permission: true,
		}
	}

	/// Scope the requirement to one instance.
	pub fn on(mut self, resource_id: impl Into<String>) -> Self {
		self.resource_id = Some(resource_id.into());
		self
	}

	/// Disable the workspace-wide fallback for instance-scoped requirements.
	pub fn instance_only(mut self) -> Self {
		self.check_workspace_permission = false;
		self
	}

	fn is_satisfied_by(&self, grants: &[PermissionGrant]) -> bool {
		let matching = |scope: Option<&str>| {
			grants.iter().any(|g| {
				g.resource == self.resource
					&& g.resource_id.as_deref() == scope
					&& g.flags.intersects(self.flag)
			})
		};

		if let Some(id) = self.resource_id.as_deref() {
			if matching(Some(id)) {
				return true;
			}
			if !self.check_workspace_permission {
				return false;
			}
		}
		matching(None)
	}
}

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResult {
	pub has_permission: bool,
	/// Every stored grant of the member, for callers that tailor responses.
	pub flags: Vec<PermissionGrant>,
}

impl PermissionResult {
	pub fn denied() -> Self {
		Self {
			has_permission: false,
			flags: Vec::new(),
		}
	}
}

/// Decide `required` for `member`.
///
/// `member` is `None` when the caller has no membership row in the workspace.
/// With `require_owner`, a non-owner member is treated as absent.
pub fn evaluate_permissions(
	member: Option<&MemberSnapshot>,
	required: &[RequiredPermission],
	require_owner: bool,
) -> PermissionResult {
	let member = match member {
		Some(m) if !require_owner || m.is_owner => m,
		_ => return PermissionResult::denied(),
	};

	let has_permission =
		member.is_owner || required.iter().all(|r| r.is_satisfied_by(&member.grants));

	PermissionResult {
		has_permission,
		flags: member.grants.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn member(is_owner: bool, grants: Vec<PermissionGrant>) -> MemberSnapshot {
		MemberSnapshot {
			member_id: MemberId::new("m1"),
			is_owner,
			grants,
		}
	}

	fn arb_flags() -> impl Strategy<Value = PermissionFlags> {
		(0u32..32).prop_map(PermissionFlags::from_bits)
	}

	fn arb_single_flag() -> impl Strategy<Value = PermissionFlags> {
		prop_oneof![
			Just(PermissionFlags::VIEW),
			Just(PermissionFlags::EDIT),
			Just(PermissionFlags::CREATE),
			Just(PermissionFlags::DELETE),
			Just(PermissionFlags::MANAGE),
		]
	}

	fn arb_resource() -> impl Strategy<Value = Resource> {
		prop_oneof![Just(Resource::Workspace), Just(Resource::Todo)]
	}

	fn arb_grant() -> impl Strategy<Value = PermissionGrant> {
		(
			arb_resource(),
			prop::option::of(prop_oneof![Just("L1".to_string()), Just("L2".to_string())]),
			arb_flags(),
		)
			.prop_map(|(resource, resource_id, flags)| PermissionGrant {
				resource,
				resource_id,
				flags,
			})
	}

	fn arb_required() -> impl Strategy<Value = RequiredPermission> {
		(
			arb_resource(),
			arb_single_flag(),
			prop::option::of(prop_oneof![Just("L1".to_string()), Just("L2".to_string())]),
			any::<bool>(),
		)
			.prop_map(|(resource, flag, resource_id, check)| RequiredPermission {
				resource,
				flag,
				resource_id,
				check_workspace_permission: check,
			})
	}

	mod flags {
		use super::*;

		#[test]
		fn values_match_wire_format() {
			assert_eq!(PermissionFlags::NONE.bits(), 0);
			assert_eq!(PermissionFlags::VIEW.bits(), 1);
			assert_eq!(PermissionFlags::EDIT.bits(), 2);
			assert_eq!(PermissionFlags::CREATE.bits(), 4);
			assert_eq!(PermissionFlags::DELETE.bits(), 8);
			assert_eq!(PermissionFlags::MANAGE.bits(), 16);
			assert_eq!(PermissionFlags::ALL.bits(), 31);
		}

		#[test]
		fn or_of_all_named_flags_is_all() {
			let all = PermissionFlags::VIEW
				| PermissionFlags::EDIT
				| PermissionFlags::CREATE
				| PermissionFlags::DELETE
				| PermissionFlags::MANAGE;
			assert_eq!(all, PermissionFlags::ALL);
		}

		#[test]
		fn debug_lists_names() {
			let f = PermissionFlags::VIEW | PermissionFlags::DELETE;
			assert_eq!(format!("{f:?}"), "VIEW | DELETE");
			assert_eq!(format!("{:?}", PermissionFlags::NONE), "NONE");
		}

		#[test]
		fn serializes_as_number() {
			let f = PermissionFlags::VIEW | PermissionFlags::EDIT;
			assert_eq!(serde_json::to_string(&f).unwrap(), "3");
		}

		proptest! {
			#[test]
			fn decomposition_recombines(bits in 0u32..32) {
				let f = PermissionFlags::from_bits(bits);
				let recombined = f
					.flags()
					.into_iter()
					.fold(PermissionFlags::NONE, |acc, x| acc | x);
				prop_assert_eq!(recombined, f);
			}

			#[test]
			fn intersects_is_bitwise_and(a in 0u32..32, b in 0u32..32) {
				let fa = PermissionFlags::from_bits(a);
				let fb = PermissionFlags::from_bits(b);
				prop_assert_eq!(fa.intersects(fb), a & b != 0);
				prop_assert_eq!((fa & fb).bits(), a & b);
			}
		}
	}

	mod resources {
		use super::*;

		#[test]
		fn wire_names_round_trip() {
			for resource in Resource::all() {
				assert_eq!(resource.as_str().parse::<Resource>().unwrap(), *resource);
				let json = serde_json::to_string(resource).unwrap();
				assert_eq!(json, format!("\"{}\"", resource.as_str()));
			}
			assert!("PROJECT".parse::<Resource>().is_err());
		}
	}

	mod evaluator {
		use super::*;

		#[test]
		fn non_member_is_denied() {
			let required = [RequiredPermission::new(Resource::Todo, PermissionFlags::VIEW)];
			let result = evaluate_permissions(None, &required, false);
			assert!(!result.has_permission);
			assert!(result.flags.is_empty());
		}

		#[test]
		fn owner_passes_with_no_grants() {
			let owner = member(true, vec![]);
			let required = [
				RequiredPermission::new(Resource::Workspace, PermissionFlags::DELETE),
				RequiredPermission::new(Resource::Todo, PermissionFlags::MANAGE).on("L9"),
			];
			assert!(evaluate_permissions(Some(&owner), &required, false).has_permission);
			assert!(evaluate_permissions(Some(&owner), &required, true).has_permission);
		}

		#[test]
		fn owner_flags_report_stored_rows() {
			let rows = vec![
				PermissionGrant::workspace_wide(Resource::Workspace, PermissionFlags::ALL),
				PermissionGrant::instance(Resource::Todo, "L1", PermissionFlags::VIEW),
			];
			let owner = member(true, rows.clone());
			let result = evaluate_permissions(Some(&owner), &[], false);
			assert_eq!(result.flags, rows);
		}

		#[test]
		fn require_owner_rejects_non_owner_even_with_flags() {
			let m = member(
				false,
				vec![PermissionGrant::workspace_wide(Resource::Workspace, PermissionFlags::ALL)],
			);
			let required = [RequiredPermission::new(Resource::Workspace, PermissionFlags::DELETE)];
			let result = evaluate_permissions(Some(&m), &required, true);
			assert!(!result.has_permission);
			assert!(result.flags.is_empty());
		}

		#[test]
		fn empty_requirements_pass_for_members() {
			let m = member(false, vec![]);
			assert!(evaluate_permissions(Some(&m), &[], false).has_permission);
		}

		#[test]
		fn workspace_wide_view_covers_any_list_but_not_edit() {
			let m = member(
				false,
				vec![PermissionGrant::workspace_wide(Resource::Todo, PermissionFlags::VIEW)],
			);
			let view = [RequiredPermission::new(Resource::Todo, PermissionFlags::VIEW).on("any-list")];
			let edit = [RequiredPermission::new(Resource::Todo, PermissionFlags::EDIT).on("any-list")];
			assert!(evaluate_permissions(Some(&m), &view, false).has_permission);
			assert!(!evaluate_permissions(Some(&m), &edit, false).has_permission);
		}

		#[test]
		fn instance_edit_on_one_list_does_not_reach_another() {
			let m = member(
				false,
				vec![
					PermissionGrant::instance(Resource::Todo, "L1", PermissionFlags::EDIT),
					PermissionGrant::workspace_wide(Resource::Todo, PermissionFlags::VIEW),
				],
			);
			let edit_l1 = [RequiredPermission::new(Resource::Todo, PermissionFlags::EDIT).on("L1")];
			let edit_l2 = [RequiredPermission::new(Resource::Todo, PermissionFlags::EDIT).on("L2")];
			assert!(evaluate_permissions(Some(&m), &edit_l1, false).has_permission);
			assert!(!evaluate_permissions(Some(&m), &edit_l2, false).has_permission);
		}

		#[test]
		fn instance_grant_does_not_imply_workspace_wide() {
			let m = member(
				false,
				vec![PermissionGrant::instance(Resource::Todo, "L1", PermissionFlags::CREATE)],
			);
			let create = [RequiredPermission::new(Resource::Todo, PermissionFlags::CREATE)];
			assert!(!evaluate_permissions(Some(&m), &create, false).has_permission);
		}

		#[test]
		fn disabled_fallback_ignores_workspace_wide_rows() {
			let m = member(
				false,
				vec![PermissionGrant::workspace_wide(Resource::Todo, PermissionFlags::ALL)],
			);
			let strict = [RequiredPermission::new(Resource::Todo, PermissionFlags::VIEW)
				.on("L1")
				.instance_only()];
			assert!(!evaluate_permissions(Some(&m), &strict, false).has_permission);
		}

		#[test]
		fn duplicate_rows_are_ored() {
			let m = member(
				false,
				vec![
					PermissionGrant::workspace_wide(Resource::Todo, PermissionFlags::NONE),
					PermissionGrant::workspace_wide(Resource::Todo, PermissionFlags::DELETE),
				],
			);
			let delete = [RequiredPermission::new(Resource::Todo, PermissionFlags::DELETE).on("L1")];
			assert!(evaluate_permissions(Some(&m), &delete, false).has_permission);
		}

		#[test]
		fn all_entries_must_pass() {
			let m = member(
				false,
				vec![PermissionGrant::workspace_wide(Resource::Workspace, PermissionFlags::VIEW)],
			);
			let required = [
				RequiredPermission::new(Resource::Workspace, PermissionFlags::VIEW),
				RequiredPermission::new(Resource::Todo, PermissionFlags::VIEW),
			];
			assert!(!evaluate_permissions(Some(&m), &required, false).has_permission);
		}

		#[test]
		fn resources_do_not_bleed() {
			let m = member(
				false,
				vec![PermissionGrant::workspace_wide(Resource::Workspace, PermissionFlags::ALL)],
			);
			let todo = [RequiredPermission::new(Resource::Todo, PermissionFlags::VIEW)];
			assert!(!evaluate_permissions(Some(&m), &todo, false).has_permission);
		}

		#[test]
		fn snapshot_helpers() {
			let m = member(
				false,
				vec![
					PermissionGrant::instance(Resource::Todo, "L2", PermissionFlags::VIEW),
					PermissionGrant::instance(Resource::Todo, "L1", PermissionFlags::VIEW | PermissionFlags::EDIT),
					PermissionGrant::instance(Resource::Todo, "L1", PermissionFlags::VIEW),
					PermissionGrant::instance(Resource::Todo, "L3", PermissionFlags::EDIT),
				],
			);
			assert_eq!(m.granted_instance_ids(Resource::Todo, PermissionFlags::VIEW), vec!["L1", "L2"]);
			assert!(!m.has_workspace_wide(Resource::Todo, PermissionFlags::VIEW));
		}

		proptest! {
			#[test]
			fn non_members_never_pass(required in prop::collection::vec(arb_required(), 0..4), owner in any::<bool>()) {
				let result = evaluate_permissions(None, &required, owner);
				prop_assert!(!result.has_permission);
				prop_assert!(result.flags.is_empty());
			}

			#[test]
			fn owners_always_pass(
				grants in prop::collection::vec(arb_grant(), 0..6),
				required in prop::collection::vec(arb_required(), 0..4),
				require_owner in any::<bool>(),
			) {
				let owner = member(true, grants.clone());
				let result = evaluate_permissions(Some(&owner), &required, require_owner);
				prop_assert!(result.has_permission);
				prop_assert_eq!(result.flags, grants);
			}

			#[test]
			fn adding_grants_never_revokes(
				grants in prop::collection::vec(arb_grant(), 0..6),
				extra in arb_grant(),
				required in prop::collection::vec(arb_required(), 0..4),
			) {
				let before = member(false, grants.clone());
				let mut more = grants;
				more.push(extra);
				let after = member(false, more);
				if evaluate_permissions(Some(&before), &required, false).has_permission {
					prop_assert!(evaluate_permissions(Some(&after), &required, false).has_permission);
				}
			}

			#[test]
			fn result_is_conjunction_of_entries(
				grants in prop::collection::vec(arb_grant(), 0..6),
				required in prop::collection::vec(arb_required(), 0..4),
			) {
				let m = member(false, grants);
				let all = evaluate_permissions(Some(&m), &required, false).has_permission;
				let each = required
					.iter()
					.all(|r| evaluate_permissions(Some(&m), std::slice::from_ref(r), false).has_permission);
				prop_assert_eq!(all, each);
			}
		}
	}
}
