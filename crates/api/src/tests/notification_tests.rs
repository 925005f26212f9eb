// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

use ride_booking_domain::BookingStatus;

use super::{
    KOLKATA, create_test_booking_request, create_test_persistence, seed_sedan, test_now,
};
use crate::{LogNotifier, NotificationEvent, Notifier, create_booking, render_template};

fn created_event() -> NotificationEvent {
    let mut persistence = create_test_persistence();
    seed_sedan(&mut persistence, "KA01AB1234");
    let (_, event) = create_booking(
        &mut persistence,
        create_test_booking_request(),
        test_now(),
        KOLKATA,
    )
    .unwrap();
    event
}

#[test]
fn test_booking_created_message() {
    let event: NotificationEvent = created_event();
    let message: String = event.render();

    assert!(message.starts_with("Hi Anita Rao, booking BK261103-"));
    assert!(message.contains("2026-11-10 10:30"));
    assert!(message.contains("(Indiranagar to Kempegowda International Airport)"));
    assert!(message.contains("Rs. 600"));
    assert!(!message.contains("{{"));
}

#[test]
fn test_status_change_message_uses_new_status() {
    let NotificationEvent::BookingCreated(mut booking) = created_event() else {
        panic!("expected a booking created event");
    };
    booking.status = BookingStatus::Confirmed;
    let event = NotificationEvent::StatusChanged {
        booking,
        previous: BookingStatus::Pending,
    };

    assert_eq!(event.name(), "status_changed");
    assert!(event.render().ends_with("is now confirmed."));
}

#[test]
fn test_unknown_and_missing_keys_are_left_alone() {
    let values: HashMap<&str, String> = HashMap::from([("bookingId", String::from("BK1"))]);

    assert_eq!(
        render_template("{{bookingId}} {{ bookingId }} {{secret}} {{status}}", &values),
        "BK1 BK1 {{secret}} {{status}}"
    );
    assert_eq!(render_template("open {{bookingId", &values), "open {{bookingId");
    assert_eq!(render_template("no placeholders", &values), "no placeholders");
}

#[test]
fn test_log_notifier_accepts_every_event() {
    assert!(LogNotifier.notify(&created_event()).is_ok());
}
