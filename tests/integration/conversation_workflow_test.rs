//! End-to-end conversation workflows: a support session as each party sees it

mod common;

use chrono::Duration;
use serde_json::json;
use supportdesk_common::Error;
use supportdesk_conversations::{
    Clock, ContentKind, ConversationResponse, Message, MessageContent, MessageFilter, Role,
};

use common::{ids, TestApp};

mod test_support_session {
    use super::*;

    #[test_log::test]
    fn test_customer_agent_robot_session() {
        let app = TestApp::new();
        let conv = app
            .registry
            .get_or_create("ticket-42", Some("Refund"), Some("Order #42"));
        let mut conv = conv.lock();

        conv.add_customer_message("m1", "cust-1", "Hello", None);
        conv.add_agent_message("m2", "agent-1", "Hi", None);
        conv.add_robot_message("m3", "robot", "Internal analysis", None);

        assert_eq!(ids(&conv.get_customer_visible_messages()), vec!["m1", "m2"]);
        assert_eq!(ids(&conv.get_agent_visible_messages()), vec!["m1", "m2", "m3"]);
        assert_eq!(ids(&conv.get_messages_for_robot_processing()), vec!["m2", "m3"]);

        let m3 = conv.get_message("m3").cloned().unwrap();
        conv.share_robot_message_with_customer(&m3, "m4").unwrap();

        assert_eq!(
            ids(&conv.get_customer_visible_messages()),
            vec!["m1", "m2", "m4"]
        );
        assert_eq!(conv.len(), 4);
        assert_eq!(conv.get_message("m3"), Some(&m3));
    }

    #[test_log::test]
    fn test_rejected_share_leaves_conversation_untouched() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-1", None, None);
        let mut conv = conv.lock();

        let customer = conv
            .add_customer_message("m1", "cust-1", "Please escalate", None)
            .clone();
        let before: Vec<Message> = conv.messages().cloned().collect();

        let err = conv
            .share_robot_message_with_customer(&customer, "m2")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert_eq!(err.error_code(), "INVALID_OPERATION");

        let after: Vec<Message> = conv.messages().cloned().collect();
        assert_eq!(before, after);
    }

    #[test_log::test]
    fn test_curated_share_keeps_internal_wording_for_audit() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-2", None, None);
        let mut conv = conv.lock();

        let draft = conv
            .add_robot_message("r1", "robot", "Customer is likely a churn risk; offer 20%", None)
            .clone();
        conv.share_edited_robot_message(&draft, "r1-shared", "We can offer you a discount")
            .unwrap();

        let customer_view = conv.get_customer_visible_messages();
        assert_eq!(ids(&customer_view), vec!["r1-shared"]);
        assert_eq!(
            customer_view[0].content.as_text(),
            Some("We can offer you a discount")
        );

        let audit = conv.filter(&MessageFilter::new().author_id("robot"));
        assert_eq!(ids(&audit), vec!["r1", "r1-shared"]);
        assert_eq!(audit[0].content, draft.content);
    }

    #[test_log::test]
    fn test_supervisor_whisper_stays_private() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-3", None, None);
        let mut conv = conv.lock();

        conv.add_customer_message("m1", "cust-1", "Where is my parcel?", None);
        conv.add_supervisor_message("m2", "sup-1", "Check the carrier portal", None);

        assert_eq!(ids(&conv.get_conversation_for_role(Role::Customer)), vec!["m1"]);
        assert_eq!(ids(&conv.get_conversation_for_role(Role::Agent)), vec!["m1"]);
        assert_eq!(
            ids(&conv.get_conversation_for_role(Role::Supervisor)),
            vec!["m1", "m2"]
        );
        assert_eq!(
            ids(&conv.get_conversation_for_role(Role::ConversationAdmin)),
            vec!["m1", "m2"]
        );
    }

    #[test_log::test]
    fn test_mixed_content_kinds() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-4", None, None);
        let mut conv = conv.lock();

        conv.add_customer_message("m1", "cust-1", MessageContent::Image(vec![0x89, 0x50]), None);
        conv.add_robot_message("m2", "robot", MessageContent::Json(json!({"label": "damaged"})), None);
        conv.add_agent_message("m3", "agent-1", "Sorry about that", None);

        assert_eq!(conv.get_message("m1").unwrap().estimated_token_count, 0);
        let images = conv.filter(&MessageFilter::new().content_kind(ContentKind::Image));
        assert_eq!(ids(&images), vec!["m1"]);
        let robot_json = conv.filter(
            &MessageFilter::new()
                .content_kind(ContentKind::Json)
                .visible_to(Role::Agent),
        );
        assert_eq!(ids(&robot_json), vec!["m2"]);
    }
}

mod test_visibility_invariants {
    use super::*;

    #[test]
    fn test_every_role_view_matches_visibility_sets() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-5", None, None);
        let mut conv = conv.lock();

        let authors = [
            Role::Customer,
            Role::Agent,
            Role::Supervisor,
            Role::Robot,
            Role::CxRobot,
            Role::Tool,
            Role::Admin,
        ];
        for (n, role) in authors.iter().cycle().take(21).enumerate() {
            let mut message = Message::new(
                format!("m{}", n),
                format!("{}-1", role),
                *role,
                MessageContent::text("text"),
                1,
                app.clock.now(),
            );
            if n % 5 == 0 {
                message = message.visible_to(Role::Robot);
            }
            conv.add_message(message);
        }

        for role in Role::ALL {
            let view = conv.get_conversation_for_role(role);
            for message in conv.messages() {
                let shown = view.iter().any(|m| m.id == message.id);
                assert_eq!(
                    shown,
                    message.role_visibilities.contains(&role),
                    "message {} for {}",
                    message.id,
                    role
                );
            }
        }
    }

    #[test]
    fn test_first_message_keeps_position_zero() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-6", None, None);
        let mut conv = conv.lock();

        conv.add_customer_message("first", "cust-1", "Hello", None);
        for n in 0..200 {
            conv.add_agent_message(format!("m{}", n), "agent-1", "reply", Some(1));
            app.clock.advance(Duration::milliseconds(1));
        }

        assert_eq!(conv.message_at(0).unwrap().id, "first");
        assert_eq!(conv.get_most_recent_message().unwrap().id, "m199");
        assert_eq!(conv.len(), 201);
    }
}

mod test_summarization {
    use super::*;

    #[test]
    fn test_incremental_summarization() {
        let app = TestApp::new();
        let conv = app.registry.get_or_create("ticket-7", None, None);
        let mut conv = conv.lock();

        for n in 0..4 {
            conv.add_customer_message(format!("m{}", n), "cust-1", "text", Some(1));
        }

        app.clock.advance(Duration::minutes(5));
        assert!(conv.mark_summarized_up_to(1));
        assert_eq!(conv.last_summarized_at(), Some(app.clock.now()));
        assert_eq!(ids(&conv.get_messages_to_summarize()), vec!["m2", "m3"]);

        assert!(!conv.mark_summarized_up_to(99));
        assert_eq!(conv.last_summarized_index(), Some(1));

        conv.mark_all_as_summarized();
        assert!(conv.get_messages_to_summarize().is_empty());
        assert_eq!(conv.len(), 4);

        let view = ConversationResponse::for_role(&conv, Role::Agent);
        let progress = view.summarization.unwrap();
        assert_eq!(progress.last_summarized_index, Some(3));
        assert_eq!(progress.pending_messages, 0);
    }
}
