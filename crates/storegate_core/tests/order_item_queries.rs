mod common;

use common::{add_category, add_item, add_order, add_product, add_user, ids, store};
use storegate_core::repo::order_item_repo::SqliteOrderItemRepository;
use storegate_core::{OrderItem, ProductItemCount, RepoError};

fn item_ids(items: &[OrderItem]) -> Vec<i64> {
    ids(items, |item| item.id)
}

#[test]
fn count_by_order_id_is_zero_for_empty_order() {
    let conn = store();
    let user = add_user(&conn, "u");
    let order = add_order(&conn, user);

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_by_order_id(order).unwrap(), 0);
    assert_eq!(repo.count_by_order_id(12_345).unwrap(), 0);
}

#[test]
fn sum_quantities_skips_null_quantities() {
    let conn = store();
    let user = add_user(&conn, "u");
    let order = add_order(&conn, user);
    let empty_order = add_order(&conn, user);
    let product = add_product(&conn, "p", 1.0, None);
    add_item(&conn, order, product, Some(2));
    add_item(&conn, order, product, Some(3));
    add_item(&conn, order, product, None);

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    assert_eq!(repo.sum_quantities_by_order_id(order).unwrap(), Some(5));
    assert_eq!(repo.count_by_order_id(order).unwrap(), 3);
    assert_eq!(repo.sum_quantities_by_order_id(empty_order).unwrap(), None);
}

#[test]
fn max_and_min_quantity_items_in_order() {
    let conn = store();
    let user = add_user(&conn, "u");
    let order = add_order(&conn, user);
    let product = add_product(&conn, "p", 1.0, None);
    let one = add_item(&conn, order, product, Some(1));
    let five = add_item(&conn, order, product, Some(5));
    add_item(&conn, order, product, Some(3));

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    let max = repo.find_max_quantity_in_order(order).unwrap().unwrap();
    assert_eq!((max.id, max.quantity), (Some(five), Some(5)));
    let min = repo.find_min_quantity_in_order(order).unwrap().unwrap();
    assert_eq!((min.id, min.quantity), (Some(one), Some(1)));
}

#[test]
fn max_quantity_ties_resolve_to_lowest_id() {
    let conn = store();
    let user = add_user(&conn, "u");
    let order = add_order(&conn, user);
    let other_order = add_order(&conn, user);
    let product = add_product(&conn, "p", 1.0, None);
    add_item(&conn, other_order, product, Some(9));
    let first_five = add_item(&conn, order, product, Some(5));
    add_item(&conn, order, product, Some(5));
    add_item(&conn, order, product, None);

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    let max = repo.find_max_quantity_in_order(order).unwrap().unwrap();
    assert_eq!(max.id, Some(first_five));
    let min = repo.find_min_quantity_in_order(order).unwrap().unwrap();
    assert_eq!(min.id, Some(first_five));

    let empty_order = add_order(&conn, user);
    assert_eq!(repo.find_max_quantity_in_order(empty_order).unwrap(), None);
}

#[test]
fn quantity_comparisons() {
    let conn = store();
    let user = add_user(&conn, "u");
    let order = add_order(&conn, user);
    let product = add_product(&conn, "p", 1.0, None);
    let q1 = add_item(&conn, order, product, Some(1));
    let q4 = add_item(&conn, order, product, Some(4));
    let q6 = add_item(&conn, order, product, Some(6));
    let q9 = add_item(&conn, order, product, Some(9));
    add_item(&conn, order, product, None);

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    assert_eq!(item_ids(&repo.find_by_quantity_greater_than(4).unwrap()), vec![q6, q9]);
    assert_eq!(item_ids(&repo.find_by_quantity_less_than(4).unwrap()), vec![q1]);
    assert_eq!(item_ids(&repo.find_by_quantity_between(4, 6).unwrap()), vec![q4, q6]);
    assert_eq!(item_ids(&repo.find_by_quantity_min_and_max(1, 4).unwrap()), vec![q1, q4]);
    assert_eq!(item_ids(&repo.find_by_quantity(9).unwrap()), vec![q9]);
    assert_eq!(
        item_ids(&repo.find_by_quantity_not_equal(9).unwrap()),
        vec![q1, q4, q6]
    );
    assert_eq!(item_ids(&repo.find_by_even_quantity().unwrap()), vec![q4, q6]);
    assert_eq!(item_ids(&repo.find_by_odd_quantity().unwrap()), vec![q1, q9]);
    assert_eq!(item_ids(&repo.find_by_quantity_multiple_of(3).unwrap()), vec![q6, q9]);
    assert_eq!(
        item_ids(&repo.find_by_order_id_and_quantity_greater_than(order, 5).unwrap()),
        vec![q6, q9]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id_and_quantity_less_than(order, 5).unwrap()),
        vec![q1, q4]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id_with_non_null_quantity(order).unwrap()),
        vec![q1, q4, q6, q9]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_id_with_non_null_quantity(product).unwrap()),
        vec![q1, q4, q6, q9]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_id_and_quantity_between(product, 2, 9).unwrap()),
        vec![q4, q6, q9]
    );
}

#[test]
fn order_scoped_sorting() {
    let conn = store();
    let user = add_user(&conn, "u");
    let order = add_order(&conn, user);
    let product = add_product(&conn, "p", 1.0, None);
    let q3 = add_item(&conn, order, product, Some(3));
    let unset = add_item(&conn, order, product, None);
    let q7 = add_item(&conn, order, product, Some(7));
    let q1 = add_item(&conn, order, product, Some(1));

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    assert_eq!(
        item_ids(&repo.find_by_order_id_order_by_quantity_asc(order).unwrap()),
        vec![unset, q1, q3, q7]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id_order_by_quantity_desc(order).unwrap()),
        vec![q7, q3, q1, unset]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_id_order_by_quantity(product).unwrap()),
        vec![unset, q1, q3, q7]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id(order).unwrap()),
        vec![q3, unset, q7, q1]
    );
    assert_eq!(repo.find_distinct_by_order_id(order).unwrap().len(), 4);
}

#[test]
fn product_attribute_joins() {
    let conn = store();
    let user = add_user(&conn, "Grace");
    let order = add_order(&conn, user);
    let tools = add_category(&conn, "Tools");
    let hammer = add_product(&conn, "Claw Hammer", 30.0, Some(tools));
    let nail = add_product(&conn, "Nail_Pack", 2.0, None);
    let hammer_item = add_item(&conn, order, hammer, Some(1));
    let nail_item = add_item(&conn, order, nail, Some(100));

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    assert_eq!(item_ids(&repo.find_by_product_name("Claw Hammer").unwrap()), vec![hammer_item]);
    assert_eq!(item_ids(&repo.find_by_product_name_like("Hamm").unwrap()), vec![hammer_item]);
    assert_eq!(item_ids(&repo.find_by_product_name_like("l_P").unwrap()), vec![nail_item]);
    assert_eq!(
        item_ids(&repo.find_by_product_name_starting_with("Claw").unwrap()),
        vec![hammer_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_name_ending_with("Pack").unwrap()),
        vec![nail_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_price_greater_than(10.0).unwrap()),
        vec![hammer_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_price_less_than(10.0).unwrap()),
        vec![nail_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_category_name("Tools").unwrap()),
        vec![hammer_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_name_and_quantity("Nail_Pack", 100).unwrap()),
        vec![nail_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id_and_product_name(order, "Claw Hammer").unwrap()),
        vec![hammer_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id_and_product_name_like(order, "Nail").unwrap()),
        vec![nail_item]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_id_and_product_id(order, nail).unwrap()),
        vec![nail_item]
    );
    assert_eq!(
        item_ids(&repo.find_distinct_by_product_id(hammer).unwrap()),
        vec![hammer_item]
    );
}

#[test]
fn customer_joins_and_id_lists() {
    let conn = store();
    let grace = add_user(&conn, "Grace");
    let linus = add_user(&conn, "Linus");
    let grace_order = add_order(&conn, grace);
    let linus_order = add_order(&conn, linus);
    let apple = add_product(&conn, "Apple", 1.0, None);
    let pear = add_product(&conn, "Pear", 1.5, None);
    let grace_apple = add_item(&conn, grace_order, apple, Some(2));
    let linus_pear = add_item(&conn, linus_order, pear, Some(3));
    let linus_apple = add_item(&conn, linus_order, apple, Some(1));

    let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
    assert_eq!(
        item_ids(&repo.find_by_customer_order_user_id(linus).unwrap()),
        vec![linus_pear, linus_apple]
    );
    assert_eq!(
        item_ids(&repo.find_by_customer_order_user_name("Grace").unwrap()),
        vec![grace_apple]
    );
    assert_eq!(
        item_ids(&repo.find_by_product_ids(&[apple]).unwrap()),
        vec![grace_apple, linus_apple]
    );
    assert_eq!(
        item_ids(&repo.find_by_order_ids(&[grace_order, linus_order]).unwrap()),
        vec![grace_apple, linus_pear, linus_apple]
    );
    assert!(matches!(
        repo.find_by_order_ids(&[]).unwrap_err(),
        RepoError::InvalidArgument(_)
    ));

    assert_eq!(
        repo.group_by_product_id_count().unwrap(),
        vec![
            ProductItemCount {
                product_id: Some(apple),
                count: 2
            },
            ProductItemCount {
                product_id: Some(pear),
                count: 1
            },
        ]
    );
}
