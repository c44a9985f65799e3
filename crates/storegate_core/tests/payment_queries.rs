mod common;

use common::{add_order, add_payment, add_user, ids, store};
use rusqlite::Connection;
use storegate_core::repo::payment_repo::SqlitePaymentRepository;
use storegate_core::{Payment, PaymentCompletion, RecordId, RepoError, StatusCount};

struct Ledger {
    orders: Vec<RecordId>,
    payments: Vec<RecordId>,
}

/// Four paid orders, one unpaid order and two payments without an order:
///
/// | payment | status      | order |
/// |---------|-------------|-------|
/// | p1      | COMPLETED   | o1    |
/// | p2      | PENDING     | o2    |
/// | p3      | COMPLETED   | o3    |
/// | p4      | FAILED      | o4    |
/// | p5      | NULL        | NULL  |
/// | p6      | ''          | NULL  |
fn ledger(conn: &Connection) -> Ledger {
    let ada = add_user(conn, "Ada Lovelace");
    let bob = add_user(conn, "Bob");
    let orders = vec![
        add_order(conn, ada),
        add_order(conn, ada),
        add_order(conn, ada),
        add_order(conn, bob),
        add_order(conn, bob),
    ];
    let payments = vec![
        add_payment(conn, Some("COMPLETED"), Some(orders[0])),
        add_payment(conn, Some("PENDING"), Some(orders[1])),
        add_payment(conn, Some("COMPLETED"), Some(orders[2])),
        add_payment(conn, Some("FAILED"), Some(orders[3])),
        add_payment(conn, None, None),
        add_payment(conn, Some(""), None),
    ];
    Ledger { orders, payments }
}

fn payment_ids(payments: &[Payment]) -> Vec<RecordId> {
    ids(payments, |payment| payment.id)
}

fn pick(ledger: &Ledger, positions: &[usize]) -> Vec<RecordId> {
    positions
        .iter()
        .map(|position| ledger.payments[position - 1])
        .collect()
}

#[test]
fn lookups_and_aggregates() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    assert_eq!(payment_ids(&repo.find_all_payments().unwrap()), ledger.payments);
    let second = repo.find_payment_by_id(ledger.payments[1]).unwrap().unwrap();
    assert_eq!(second.status.as_deref(), Some("PENDING"));
    assert_eq!(repo.find_payment_by_id(9_999).unwrap(), None);

    assert_eq!(
        payment_ids(&repo.find_payments_by_status("COMPLETED").unwrap()),
        pick(&ledger, &[1, 3])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_by_order_id(ledger.orders[3]).unwrap()),
        pick(&ledger, &[4])
    );

    let id_sum: i64 = ledger.payments.iter().sum();
    assert_eq!(repo.count_payments().unwrap(), 6);
    assert_eq!(repo.sum_payment_ids().unwrap(), Some(id_sum));
    assert_eq!(
        repo.find_average_payment_id().unwrap(),
        Some(id_sum as f64 / 6.0)
    );
}

#[test]
fn payment_for_order_loads_the_one_to_one_side() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    let payment = repo.payment_for_order(ledger.orders[1]).unwrap().unwrap();
    assert_eq!(payment.id, Some(ledger.payments[1]));
    assert_eq!(repo.payment_for_order(ledger.orders[4]).unwrap(), None);
}

#[test]
fn status_ordering_puts_null_first_ascending() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    assert_eq!(
        repo.find_distinct_statuses().unwrap(),
        vec![
            None,
            Some(String::new()),
            Some("COMPLETED".to_string()),
            Some("FAILED".to_string()),
            Some("PENDING".to_string()),
        ]
    );
    assert_eq!(
        payment_ids(&repo.find_payments_order_by_status_asc().unwrap()),
        pick(&ledger, &[5, 6, 1, 3, 4, 2])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_order_by_status_desc().unwrap()),
        pick(&ledger, &[2, 4, 1, 3, 6, 5])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_ordered_by_custom_case().unwrap()),
        pick(&ledger, &[1, 3, 2, 4, 5, 6])
    );
}

#[test]
fn order_joins_skip_orderless_payments() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();
    let with_order = pick(&ledger, &[1, 2, 3, 4]);

    assert_eq!(payment_ids(&repo.find_payments_with_order_details().unwrap()), with_order);
    assert_eq!(payment_ids(&repo.find_payments_with_order_and_user().unwrap()), with_order);
    assert_eq!(payment_ids(&repo.find_payments_using_cte().unwrap()), with_order);
    assert_eq!(payment_ids(&repo.find_payments_with_valid_order().unwrap()), with_order);
    assert_eq!(
        payment_ids(&repo.find_payments_with_non_null_order_id().unwrap()),
        with_order
    );
    assert_eq!(payment_ids(&repo.find_payments_using_nullif().unwrap()), with_order);
    assert_eq!(
        payment_ids(&repo.find_payments_with_null_order_id().unwrap()),
        pick(&ledger, &[5, 6])
    );
    assert_eq!(
        payment_ids(
            &repo
                .find_payments_by_customer_order_condition(ledger.orders[1])
                .unwrap()
        ),
        pick(&ledger, &[3, 4])
    );

    let valid_user = payment_ids(&repo.find_payments_with_valid_user().unwrap());
    assert!(with_order.iter().all(|id| valid_user.contains(id)));

    assert_eq!(
        payment_ids(&repo.find_payments_by_user_name_pattern_using_cte("Love").unwrap()),
        pick(&ledger, &[1, 2, 3])
    );
}

#[test]
fn status_counts_and_thresholds() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    let count = |status: Option<&str>, count: i64| StatusCount {
        status: status.map(str::to_string),
        count,
    };
    assert_eq!(
        repo.group_payments_by_status().unwrap(),
        vec![
            count(None, 1),
            count(Some(""), 1),
            count(Some("COMPLETED"), 2),
            count(Some("FAILED"), 1),
            count(Some("PENDING"), 1),
        ]
    );
    assert_eq!(
        repo.find_payment_status_counts_using_cte(1).unwrap(),
        vec![count(Some("COMPLETED"), 2)]
    );
    assert!(repo.find_payment_status_counts_using_cte(2).unwrap().is_empty());
    assert_eq!(
        payment_ids(&repo.find_payments_having_count_greater_than(1).unwrap()),
        pick(&ledger, &[1, 3])
    );
}

#[test]
fn status_filters() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    assert_eq!(
        payment_ids(&repo.find_payments_by_status_pattern("PLET").unwrap()),
        pick(&ledger, &[1, 3])
    );
    assert!(repo.find_payments_by_status_pattern("%").unwrap().is_empty());
    assert_eq!(
        payment_ids(
            &repo
                .find_payments_by_status_and_order_id("COMPLETED", ledger.orders[2])
                .unwrap()
        ),
        pick(&ledger, &[3])
    );
    assert_eq!(
        payment_ids(
            &repo
                .find_payments_by_statuses(&["PENDING".to_string(), "FAILED".to_string()])
                .unwrap()
        ),
        pick(&ledger, &[2, 4])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_with_non_null_status().unwrap()),
        pick(&ledger, &[1, 2, 3, 4, 6])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_with_non_empty_status().unwrap()),
        pick(&ledger, &[1, 2, 3, 4])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_using_in_subquery().unwrap()),
        pick(&ledger, &[1, 2, 3, 4, 6])
    );
    assert_eq!(
        payment_ids(
            &repo
                .find_payments_excluding_statuses(&["COMPLETED".to_string()])
                .unwrap()
        ),
        pick(&ledger, &[2, 4, 6])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_using_coalesce("N/A").unwrap()),
        pick(&ledger, &[5])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_using_upper("completed").unwrap()),
        pick(&ledger, &[1, 3])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_using_lower("Pending").unwrap()),
        pick(&ledger, &[2])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_by_nested_subquery(ledger.payments[0]).unwrap()),
        pick(&ledger, &[1, 3])
    );
    assert!(repo
        .find_payments_by_nested_subquery(ledger.payments[4])
        .unwrap()
        .is_empty());
    assert_eq!(
        payment_ids(&repo.find_payments_using_union("FAILED", ledger.orders[1]).unwrap()),
        pick(&ledger, &[2, 4])
    );
    assert_eq!(
        payment_ids(&repo.find_payments_using_union("COMPLETED", ledger.orders[0]).unwrap()),
        pick(&ledger, &[1, 3])
    );
}

#[test]
fn empty_in_lists_are_rejected() {
    let conn = store();
    ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.find_payments_by_statuses(&[]).unwrap_err(),
        RepoError::InvalidArgument(_)
    ));
    assert!(matches!(
        repo.find_payments_excluding_statuses(&[]).unwrap_err(),
        RepoError::InvalidArgument(_)
    ));
    assert!(matches!(
        repo.find_payments_by_id_list(&[]).unwrap_err(),
        RepoError::InvalidArgument(_)
    ));
}

#[test]
fn completion_flag_per_payment() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    let flags: Vec<bool> = repo
        .find_payments_using_case()
        .unwrap()
        .iter()
        .map(|completion| completion.is_completed)
        .collect();
    assert_eq!(flags, vec![true, false, true, false, false, false]);
    assert_eq!(
        repo.find_payments_using_case().unwrap()[0],
        PaymentCompletion {
            payment_id: ledger.payments[0],
            is_completed: true
        }
    );
}

#[test]
fn id_arithmetic_filters() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    let even: Vec<RecordId> = ledger
        .payments
        .iter()
        .copied()
        .filter(|id| id % 2 == 0)
        .collect();
    assert_eq!(payment_ids(&repo.find_payments_with_even_id().unwrap()), even);
    assert_eq!(
        payment_ids(
            &repo
                .find_payments_by_id_range(ledger.payments[1], ledger.payments[3])
                .unwrap()
        ),
        pick(&ledger, &[2, 3, 4])
    );
    assert_eq!(
        payment_ids(
            &repo
                .find_payments_by_id_list(&[ledger.payments[5], ledger.payments[1]])
                .unwrap()
        ),
        pick(&ledger, &[2, 6])
    );
}

#[test]
fn greatest_and_least_ignore_orderless_payments() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    let greatest = payment_ids(&repo.find_payments_using_greatest(0).unwrap());
    assert_eq!(greatest, pick(&ledger, &[1, 2, 3, 4]));
    let least = payment_ids(&repo.find_payments_using_least(i64::MAX).unwrap());
    assert_eq!(least, pick(&ledger, &[1, 2, 3, 4]));

    let biggest = ledger.payments[3].max(ledger.orders[3]);
    assert!(repo.find_payments_using_greatest(biggest).unwrap().is_empty());
}

#[test]
fn paging_and_ranking() {
    let conn = store();
    let ledger = ledger(&conn);
    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();

    assert_eq!(
        payment_ids(&repo.find_payments_with_pagination(2, 1).unwrap()),
        pick(&ledger, &[2, 3])
    );
    assert!(repo.find_payments_with_pagination(5, 10).unwrap().is_empty());
    assert!(matches!(
        repo.find_payments_with_pagination(1, -1).unwrap_err(),
        RepoError::InvalidArgument(_)
    ));

    assert_eq!(
        payment_ids(&repo.find_payments_order_by_id_desc().unwrap()),
        pick(&ledger, &[6, 5, 4, 3, 2, 1])
    );
    assert_eq!(
        repo.find_latest_payment().unwrap().and_then(|payment| payment.id),
        Some(ledger.payments[5])
    );
    assert_eq!(
        repo.find_oldest_payment().unwrap().and_then(|payment| payment.id),
        Some(ledger.payments[0])
    );

    assert_eq!(
        payment_ids(&repo.find_payment_by_row_number(2).unwrap()),
        pick(&ledger, &[2])
    );
    assert!(repo.find_payment_by_row_number(7).unwrap().is_empty());
    assert_eq!(
        payment_ids(&repo.find_top_n_payments_using_cte(2).unwrap()),
        pick(&ledger, &[6, 5])
    );
    assert!(repo.find_top_n_payments_using_cte(0).unwrap().is_empty());

    assert_eq!(
        payment_ids(&repo.find_payments_by_status_with_limit("COMPLETED", 1).unwrap()),
        pick(&ledger, &[1])
    );
    assert!(matches!(
        repo.find_payments_by_status_with_limit("COMPLETED", -1)
            .unwrap_err(),
        RepoError::InvalidArgument(_)
    ));
}

#[test]
fn recursive_chain_terminates_on_cycles() {
    let conn = store();
    let user = add_user(&conn, "loop");
    let o1 = add_order(&conn, user);
    let o2 = add_order(&conn, user);
    let o3 = add_order(&conn, user);
    // A fresh store numbers orders and payments from 1, so payment ids and
    // order ids line up and the chain 1 -> 2 -> 3 -> 1 closes.
    assert_eq!((o1, o2, o3), (1, 2, 3));
    let p1 = add_payment(&conn, Some("A"), Some(o3));
    let p2 = add_payment(&conn, Some("B"), Some(o1));
    let p3 = add_payment(&conn, Some("C"), Some(o2));

    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();
    assert_eq!(
        payment_ids(&repo.find_payments_using_recursive_cte(p1).unwrap()),
        vec![p1, p2, p3]
    );
    assert!(repo
        .find_payments_using_recursive_cte(9_999)
        .unwrap()
        .is_empty());
}
