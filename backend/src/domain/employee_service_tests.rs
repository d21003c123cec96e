//! Tests for the employee service: caching, fallbacks and write semantics.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use pagination::PageRequest;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{EmployeeCacheError, MockEmployeeCache, MockEmployeeRepository};
use crate::domain::{EmployeeName, ErrorCode, SalaryIncrease};
use crate::domain::resilience::{CircuitState, ResilienceConfig, ResilienceRejection};
use crate::outbound::cache::{CacheTtl, InMemoryEmployeeCache, NoOpEmployeeCache};
use crate::outbound::memory::InMemoryEmployeeRepository;
use crate::test_support::employees::{date, draft, employee, full_draft};
use crate::test_support::resilience::{MutableClock, instant_runtime, relaxed_config};

type MemoryService = EmployeeService<InMemoryEmployeeRepository, InMemoryEmployeeCache>;

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::fixed())
}

fn policy(clock: Arc<MutableClock>, config: ResilienceConfig) -> Arc<ResiliencePolicy> {
    Arc::new(ResiliencePolicy::with_runtime(
        "employee-store",
        config,
        clock,
        instant_runtime(),
    ))
}

fn memory_service(clock: &Arc<MutableClock>, staff: Vec<Employee>) -> MemoryService {
    let cache = InMemoryEmployeeCache::new(clock.clone(), CacheTtl::exact(Duration::from_secs(600)));
    EmployeeService::new(
        Arc::new(InMemoryEmployeeRepository::with_employees(staff)),
        Arc::new(cache),
        clock.clone(),
        policy(clock.clone(), relaxed_config()),
    )
}

fn mocked_service(
    clock: &Arc<MutableClock>,
    repository: MockEmployeeRepository,
    cache: MockEmployeeCache,
) -> EmployeeService<MockEmployeeRepository, MockEmployeeCache> {
    EmployeeService::new(
        Arc::new(repository),
        Arc::new(cache),
        clock.clone(),
        policy(clock.clone(), relaxed_config()),
    )
}

fn quiet_cache() -> MockEmployeeCache {
    let mut cache = MockEmployeeCache::new();
    cache.expect_get().returning(|_| Ok(None));
    cache.expect_put().returning(|_, _| Ok(()));
    cache.expect_evict().returning(|_| Ok(()));
    cache.expect_evict_namespace().returning(|_| Ok(()));
    cache
}

fn promotion(position: &str, increase: f64) -> Promotion {
    Promotion {
        position: Position::new(position).expect("position"),
        increase: SalaryIncrease::new(increase).expect("increase"),
    }
}

#[rstest]
#[tokio::test]
async fn create_assigns_fresh_ids(clock: Arc<MutableClock>) {
    let service = memory_service(&clock, Vec::new());
    let first = service
        .create_employee(draft("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10)))
        .await
        .expect("create first");
    let second = service
        .create_employee(draft("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10)))
        .await
        .expect("create second");

    assert_ne!(first.id(), second.id());
    assert!(!first.id().as_uuid().is_nil());
    let fetched = service.get_employee(first.id()).await.expect("get");
    assert_eq!(fetched, Some(first));
}

#[rstest]
#[tokio::test]
async fn unknown_ids_are_not_found_everywhere(clock: Arc<MutableClock>) {
    let service = memory_service(&clock, Vec::new());
    let id = EmployeeId::random();
    let expected = format!("Employee not found with id: {id}");

    let get = service.get_employee(id).await.expect_err("get");
    let update = service
        .update_employee(id, draft("Bruno Diaz", "Manager", 4000.0, date(2020, 6, 1)))
        .await
        .expect_err("update");
    let promote = service
        .promote_employee(id, promotion("Lead", 100.0))
        .await
        .expect_err("promote");
    let delete = service.delete_employee(id).await.expect_err("delete");

    for err in [get, update, promote, delete] {
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), expected);
    }
}

#[rstest]
#[tokio::test]
async fn promotion_adds_increase_and_sets_position(clock: Arc<MutableClock>) {
    let ana = employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10));
    let service = memory_service(&clock, vec![ana.clone()]);

    let promoted = service
        .promote_employee(ana.id(), promotion("Senior Engineer", 250.5))
        .await
        .expect("promote");

    assert_eq!(promoted.position().as_ref(), "Senior Engineer");
    assert!((promoted.salary().value() - 3250.5).abs() < f64::EPSILON);
    let stored = service.get_employee(ana.id()).await.expect("get");
    assert_eq!(stored, Some(promoted));
}

#[rstest]
#[tokio::test]
async fn writes_are_visible_through_the_cache(clock: Arc<MutableClock>) {
    let ana = employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10));
    let service = memory_service(&clock, vec![ana.clone()]);
    let page = PageRequest::first();

    // Warm both namespaces.
    assert_eq!(service.list_employees(page).await.expect("list").len(), 1);
    assert!(service.get_employee(ana.id()).await.expect("get").is_some());

    let updated = service
        .update_employee(ana.id(), draft("Ana Maria Lopez", "Engineer", 3100.0, date(2024, 1, 10)))
        .await
        .expect("update");
    assert_eq!(
        service.get_employee(ana.id()).await.expect("get"),
        Some(updated.clone())
    );
    assert_eq!(service.list_employees(page).await.expect("list"), vec![updated]);

    let bruno = service
        .create_employee(draft("Bruno Diaz", "Manager", 5000.0, date(2020, 6, 1)))
        .await
        .expect("create");
    let listed = service.list_employees(page).await.expect("list");
    assert_eq!(listed.first().map(Employee::id), Some(bruno.id()));

    service.delete_employee(ana.id()).await.expect("delete");
    let err = service.get_employee(ana.id()).await.expect_err("deleted");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(service.list_employees(page).await.expect("list"), vec![bruno]);
}

#[rstest]
#[tokio::test]
async fn cache_hit_skips_the_repository(clock: Arc<MutableClock>) {
    let ana = employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10));
    let cached = ana.clone();
    let mut cache = MockEmployeeCache::new();
    cache
        .expect_get()
        .times(1)
        .returning(move |_| Ok(Some(CachedEmployees::One(cached.clone()))));
    let mut repository = MockEmployeeRepository::new();
    repository.expect_find_by_id().never();

    let service = mocked_service(&clock, repository, cache);
    assert_eq!(service.get_employee(ana.id()).await.expect("get"), Some(ana));
}

#[rstest]
#[tokio::test]
async fn cache_failures_are_treated_as_misses(clock: Arc<MutableClock>) {
    let ana = employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10));
    let stored = ana.clone();
    let mut cache = MockEmployeeCache::new();
    cache
        .expect_get()
        .returning(|_| Err(EmployeeCacheError::backend("redis down")));
    cache
        .expect_put()
        .returning(|_, _| Err(EmployeeCacheError::backend("redis down")));
    let mut repository = MockEmployeeRepository::new();
    repository
        .expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(stored.clone())));

    let service = mocked_service(&clock, repository, cache);
    assert_eq!(service.get_employee(ana.id()).await.expect("get"), Some(ana));
}

#[rstest]
#[tokio::test]
async fn list_falls_back_to_empty_when_store_fails(clock: Arc<MutableClock>) {
    let mut repository = MockEmployeeRepository::new();
    repository
        .expect_find_page_by_salary_desc()
        .times(3)
        .returning(|_| Err(EmployeeRepositoryError::connection("refused")));

    let service = mocked_service(&clock, repository, quiet_cache());
    let listed = service
        .list_employees(PageRequest::first())
        .await
        .expect("fallback");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn get_falls_back_to_none_when_store_fails(clock: Arc<MutableClock>) {
    let mut repository = MockEmployeeRepository::new();
    repository
        .expect_find_by_id()
        .times(3)
        .returning(|_| Err(EmployeeRepositoryError::connection("refused")));

    let service = mocked_service(&clock, repository, quiet_cache());
    let fetched = service
        .get_employee(EmployeeId::random())
        .await
        .expect("fallback");
    assert_eq!(fetched, None);
}

#[rstest]
#[case::connection(EmployeeRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(EmployeeRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn operations_without_fallback_report_store_failures(
    clock: Arc<MutableClock>,
    #[case] failure: EmployeeRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repository = MockEmployeeRepository::new();
    repository
        .expect_find_by_name_containing()
        .returning(move |_| Err(failure.clone()));

    let service = mocked_service(&clock, repository, quiet_cache());
    let err = service.search_by_name("ana").await.expect_err("failure");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn open_circuit_maps_to_service_unavailable(clock: Arc<MutableClock>) {
    let config = ResilienceConfig {
        max_attempts: 1,
        circuit_failure_threshold: 1,
        ..relaxed_config()
    };
    let mut repository = MockEmployeeRepository::new();
    repository
        .expect_find_all()
        .times(1)
        .returning(|| Err(EmployeeRepositoryError::connection("refused")));
    let service = EmployeeService::new(
        Arc::new(repository),
        Arc::new(NoOpEmployeeCache),
        clock.clone(),
        policy(clock.clone(), config),
    );

    let first = service.salary_extremes().await.expect_err("store down");
    let second = service.salary_extremes().await.expect_err("circuit open");
    assert_eq!(first.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(second.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
fn rejections_map_to_service_unavailable() {
    let err = store_error(
        "list",
        ResilienceError::Rejected(ResilienceRejection::RateLimited),
    );
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn blank_search_is_rejected(clock: Arc<MutableClock>) {
    let service = memory_service(&clock, Vec::new());
    let err = service.search_by_name("   ").await.expect_err("blank");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn salary_range_returns_exactly_the_members(clock: Arc<MutableClock>) {
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, date(2024, 1, 10)),
        employee("Bruno Diaz", "Manager", 2000.0, date(2020, 6, 1)),
        employee("Carla Ruiz", "Engineer", 3000.0, date(2025, 11, 20)),
        employee("Dario Sosa", "Analyst", 4000.0, date(2023, 3, 3)),
    ];
    let service = memory_service(&clock, staff.clone());
    let range = SalaryRange::new(2000.0, 3000.0).expect("range");

    let found = service.find_by_salary_range(range).await.expect("query");

    let mut expected: Vec<EmployeeName> = staff
        .iter()
        .filter(|e| (2000.0..=3000.0).contains(&e.salary().value()))
        .map(|e| e.name().clone())
        .collect();
    let mut actual: Vec<EmployeeName> = found.iter().map(|e| e.name().clone()).collect();
    expected.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
    actual.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
    assert_eq!(actual, expected);
}

#[rstest]
#[tokio::test]
async fn top_earners_are_salary_descending(clock: Arc<MutableClock>) {
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, date(2024, 1, 10)),
        employee("Bruno Diaz", "Manager", 5000.0, date(2020, 6, 1)),
        employee("Carla Ruiz", "Engineer", 3000.0, date(2025, 11, 20)),
    ];
    let service = memory_service(&clock, staff);
    let top = service.top_earners(2).await.expect("query");
    let salaries: Vec<f64> = top.iter().map(|e| e.salary().value()).collect();
    assert_eq!(salaries, vec![5000.0, 3000.0]);
}

#[rstest]
#[tokio::test]
async fn salary_extremes_of_empty_store_is_not_found(clock: Arc<MutableClock>) {
    let service = memory_service(&clock, Vec::new());
    let err = service.salary_extremes().await.expect_err("empty");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), NO_EMPLOYEES_FOR_EXTREMES);
}

#[rstest]
#[tokio::test]
async fn salary_extremes_pick_lowest_and_highest(clock: Arc<MutableClock>) {
    let low = employee("Ana Lopez", "Engineer", 1000.0, date(2024, 1, 10));
    let high = employee("Bruno Diaz", "Manager", 5000.0, date(2020, 6, 1));
    let service = memory_service(&clock, vec![low.clone(), high.clone()]);
    let extremes = service.salary_extremes().await.expect("extremes");
    assert_eq!(extremes.min, low);
    assert_eq!(extremes.max, high);
}

#[rstest]
#[tokio::test]
async fn recent_hires_use_calendar_month_cutoff(clock: Arc<MutableClock>) {
    let today = clock.local().date_naive();
    let six_months_ago = today.checked_sub_months(Months::new(6)).expect("cutoff");
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, today),
        employee("Bruno Diaz", "Manager", 5000.0, six_months_ago),
        employee(
            "Carla Ruiz",
            "Engineer",
            3000.0,
            six_months_ago.pred_opt().expect("previous day"),
        ),
        employee("Dario Sosa", "Analyst", 4000.0, date(2020, 1, 1)),
    ];
    let service = memory_service(&clock, staff);

    let mut previous = 0;
    for months in [0, 6, 7, 120] {
        let hires = service.recent_hires(months).await.expect("query");
        let cutoff = today
            .checked_sub_months(Months::new(months))
            .expect("cutoff");
        assert!(hires.iter().all(|e| e.hire_date() >= cutoff));
        assert!(hires.len() >= previous, "window shrank at {months} months");
        previous = hires.len();
    }
    assert_eq!(service.recent_hires(0).await.expect("query").len(), 1);
    assert_eq!(service.recent_hires(6).await.expect("query").len(), 2);
    assert_eq!(service.recent_hires(120).await.expect("query").len(), 4);
}

#[rstest]
#[tokio::test]
async fn hire_date_range_includes_both_bounds(clock: Arc<MutableClock>) {
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, date(2023, 12, 31)),
        employee("Bruno Diaz", "Manager", 5000.0, date(2024, 1, 1)),
        employee("Carla Ruiz", "Engineer", 3000.0, date(2024, 3, 15)),
        employee("Dario Sosa", "Analyst", 4000.0, date(2024, 6, 30)),
        employee("Elena Vega", "Analyst", 4500.0, date(2024, 7, 1)),
    ];
    let service = memory_service(&clock, staff);
    let range = HireDateRange::new(date(2024, 1, 1), date(2024, 6, 30)).expect("range");

    let found = service.find_by_hire_date_range(range).await.expect("query");

    let mut names: Vec<&str> = found.iter().map(|e| e.name().as_ref()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Bruno Diaz", "Carla Ruiz", "Dario Sosa"]);
}

#[rstest]
#[tokio::test]
async fn single_day_hire_date_range_matches_that_day(clock: Arc<MutableClock>) {
    let day = date(2024, 2, 29);
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, day),
        employee("Bruno Diaz", "Manager", 5000.0, date(2024, 3, 1)),
    ];
    let service = memory_service(&clock, staff);
    let range = HireDateRange::new(day, day).expect("range");

    let found = service.find_by_hire_date_range(range).await.expect("query");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].hire_date(), day);
}

#[rstest]
#[tokio::test]
async fn position_lookup_is_exact(clock: Arc<MutableClock>) {
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, date(2024, 1, 10)),
        employee("Bruno Diaz", "Senior Engineer", 5000.0, date(2020, 6, 1)),
        employee("Carla Ruiz", "Engineer", 3000.0, date(2025, 11, 20)),
    ];
    let service = memory_service(&clock, staff);

    let found = service
        .find_by_position(&Position::new("Engineer").expect("position"))
        .await
        .expect("query");

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|e| e.position().as_ref() == "Engineer"));
}

#[rstest]
#[tokio::test]
async fn department_count_only_counts_members(clock: Arc<MutableClock>) {
    let staff = vec![
        Employee::from_draft(
            EmployeeId::random(),
            full_draft("Ana Lopez", "Engineer", 1000.0, date(2024, 1, 10), "R&D", "ana@example.com"),
        ),
        Employee::from_draft(
            EmployeeId::random(),
            full_draft("Bruno Diaz", "Manager", 5000.0, date(2020, 6, 1), "R&D", "bruno@example.com"),
        ),
        Employee::from_draft(
            EmployeeId::random(),
            full_draft("Carla Ruiz", "Analyst", 3000.0, date(2025, 11, 20), "Sales", "carla@example.com"),
        ),
        employee("Dario Sosa", "Analyst", 4000.0, date(2023, 3, 3)),
    ];
    let service = memory_service(&clock, staff);

    let rnd = Department::new("R&D").expect("department");
    let empty = Department::new("Legal").expect("department");
    assert_eq!(service.count_by_department(&rnd).await.expect("count"), 2);
    assert_eq!(service.count_by_department(&empty).await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn email_lookup_finds_the_single_holder(clock: Arc<MutableClock>) {
    let carla = Employee::from_draft(
        EmployeeId::random(),
        full_draft("Carla Ruiz", "Analyst", 3000.0, date(2025, 11, 20), "Sales", "carla@example.com"),
    );
    let staff = vec![carla.clone(), employee("Dario Sosa", "Analyst", 4000.0, date(2023, 3, 3))];
    let service = memory_service(&clock, staff);

    let hit = service
        .find_by_email(&EmailAddress::new("carla@example.com").expect("email"))
        .await
        .expect("query");
    let miss = service
        .find_by_email(&EmailAddress::new("nobody@example.com").expect("email"))
        .await
        .expect("query");

    assert_eq!(hit, Some(carla));
    assert_eq!(miss, None);
}

#[rstest]
#[tokio::test]
async fn top_by_position_is_salary_descending_and_limited(clock: Arc<MutableClock>) {
    let staff = vec![
        employee("Ana Lopez", "Engineer", 1000.0, date(2024, 1, 10)),
        employee("Bruno Diaz", "Engineer", 5000.0, date(2020, 6, 1)),
        employee("Carla Ruiz", "Engineer", 3000.0, date(2025, 11, 20)),
        employee("Dario Sosa", "Analyst", 9000.0, date(2023, 3, 3)),
    ];
    let service = memory_service(&clock, staff);
    let engineer = Position::new("Engineer").expect("position");

    let top = service.top_by_position(&engineer, 2).await.expect("query");

    let salaries: Vec<f64> = top.iter().map(|e| e.salary().value()).collect();
    assert_eq!(salaries, vec![5000.0, 3000.0]);
}

#[rstest]
#[tokio::test]
async fn top_by_position_rejects_zero_limit(clock: Arc<MutableClock>) {
    let mut repository = MockEmployeeRepository::new();
    repository.expect_find_top_by_position().never();
    let service = mocked_service(&clock, repository, quiet_cache());

    let err = service
        .top_by_position(&Position::new("Engineer").expect("position"), 0)
        .await
        .expect_err("zero limit");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn rejected_statements_are_not_retried_and_leave_the_breaker_closed(
    clock: Arc<MutableClock>,
) {
    let config = ResilienceConfig {
        circuit_failure_threshold: 1,
        ..relaxed_config()
    };
    let mut repository = MockEmployeeRepository::new();
    repository
        .expect_insert()
        .times(2)
        .returning(|_| Err(EmployeeRepositoryError::rejected("value too long")));
    repository.expect_find_all().times(1).returning(|| Ok(Vec::new()));
    let policy = policy(clock.clone(), config);
    let service = EmployeeService::new(
        Arc::new(repository),
        Arc::new(NoOpEmployeeCache),
        clock.clone(),
        Arc::clone(&policy),
    );

    for _ in 0..2 {
        let err = service
            .create_employee(draft("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10)))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    assert_eq!(policy.circuit_state(), Some(CircuitState::Closed));
    let healthy = service.salary_extremes().await.expect_err("empty store");
    assert_eq!(healthy.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn writes_evict_id_entry_and_pages(clock: Arc<MutableClock>) {
    let ana = employee("Ana Lopez", "Engineer", 3000.0, date(2024, 1, 10));
    let id = ana.id();
    let mut repository = MockEmployeeRepository::new();
    repository.expect_delete().times(1).returning(|_| Ok(true));
    let mut cache = MockEmployeeCache::new();
    cache
        .expect_evict()
        .withf(move |key| *key == EmployeeCacheKey::by_id(id))
        .times(1)
        .returning(|_| Ok(()));
    cache
        .expect_evict_namespace()
        .withf(|namespace| *namespace == CacheNamespace::Pages)
        .times(1)
        .returning(|_| Ok(()));

    let service = mocked_service(&clock, repository, cache);
    service.delete_employee(id).await.expect("delete");
}

#[rstest]
#[tokio::test]
async fn overflowing_promotion_is_invalid_and_leaves_record(clock: Arc<MutableClock>) {
    let ana = employee("Ana Lopez", "Engineer", f64::MAX, date(2024, 1, 10));
    let service = memory_service(&clock, vec![ana.clone()]);

    let err = service
        .promote_employee(ana.id(), promotion("Lead", f64::MAX))
        .await
        .expect_err("overflow");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("salario")
    );
    assert_eq!(service.get_employee(ana.id()).await.expect("get"), Some(ana));
}
