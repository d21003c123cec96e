//! Role checks used by HTTP handlers.
//!
//! Handlers resolve the session principal and call one of these guards before
//! touching a driving port, so a rejected caller never reaches the service.

use crate::domain::{EmployeeId, Error, Principal, Role};

use super::ApiResult;
use super::session::SessionContext;

/// Roles allowed to manage employee records.
pub const STAFF: &[Role] = &[Role::Admin, Role::Hr];
/// Roles allowed to delete and promote.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

fn forbidden(principal: &Principal) -> Error {
    tracing::info!(
        subject = principal.subject(),
        role = %principal.role(),
        "principal lacks the required role"
    );
    Error::forbidden("insufficient role for this operation")
}

/// Allow `principal` only when it holds one of `roles`.
pub fn require_roles(principal: &Principal, roles: &[Role]) -> ApiResult<()> {
    if principal.has_any_role(roles) {
        Ok(())
    } else {
        Err(forbidden(principal))
    }
}

/// Allow `principal` when it holds one of `roles` or is the employee `id`.
pub fn require_self_or_roles(principal: &Principal, id: EmployeeId, roles: &[Role]) -> ApiResult<()> {
    if principal.has_any_role(roles) || principal.is_employee(id) {
        Ok(())
    } else {
        Err(forbidden(principal))
    }
}

/// Resolve the session principal and check it holds one of `roles`.
///
/// `401` without a session, `403` with the wrong role.
pub fn authorise(session: &SessionContext, roles: &[Role]) -> ApiResult<Principal> {
    let principal = session.require_principal()?;
    require_roles(&principal, roles)?;
    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::FIXTURE_EMPLOYEE_SUBJECT;
    use rstest::rstest;

    fn employee_id(raw: &str) -> EmployeeId {
        EmployeeId::new(raw).expect("fixture id")
    }

    #[rstest]
    #[case(Role::Admin, STAFF, true)]
    #[case(Role::Hr, STAFF, true)]
    #[case(Role::Employee, STAFF, false)]
    #[case(Role::Admin, ADMIN_ONLY, true)]
    #[case(Role::Hr, ADMIN_ONLY, false)]
    fn role_lists_gate_access(#[case] role: Role, #[case] roles: &[Role], #[case] allowed: bool) {
        let result = require_roles(&Principal::new("someone", role), roles);
        match result {
            Ok(()) => assert!(allowed),
            Err(err) => {
                assert!(!allowed);
                assert_eq!(err.code(), ErrorCode::Forbidden);
            }
        }
    }

    #[rstest]
    fn employees_may_read_their_own_record() {
        let principal = Principal::new(FIXTURE_EMPLOYEE_SUBJECT, Role::Employee);
        assert!(require_self_or_roles(&principal, employee_id(FIXTURE_EMPLOYEE_SUBJECT), STAFF).is_ok());
    }

    #[rstest]
    fn employees_may_not_read_other_records() {
        let principal = Principal::new(FIXTURE_EMPLOYEE_SUBJECT, Role::Employee);
        let other = employee_id("9f6b1c2e-8d0a-4c4e-9a51-1f2e3d4c5b6a");
        let err = require_self_or_roles(&principal, other, STAFF).expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn staff_subjects_never_match_an_employee_id() {
        let principal = Principal::new(FIXTURE_EMPLOYEE_SUBJECT, Role::Hr);
        assert!(!principal.is_employee(employee_id(FIXTURE_EMPLOYEE_SUBJECT)));
        assert!(require_self_or_roles(&principal, employee_id(FIXTURE_EMPLOYEE_SUBJECT), ADMIN_ONLY).is_err());
    }
}
