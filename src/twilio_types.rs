pub fn wrap_twiml(twiml: String) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{twiml}")
}

mod twiml {
    use xmlserde_derives::XmlSerialize;

    #[derive(PartialEq, Eq, Debug, Default, XmlSerialize)]
    #[xmlserde(root = b"Response")]
    pub struct Response {
        #[xmlserde(ty = "untag")]
        pub actions: Vec<ResponseAction>,
    }

    impl Response {
        /// Append a spoken line to the script.
        pub fn say(&mut self, text: impl Into<String>) {
            self.actions
                .push(ResponseAction::Say(SayAction { text: text.into() }));
        }

        /// Concatenated text of every `<Say>` action, in order.
        pub fn spoken_text(&self) -> String {
            self.actions
                .iter()
                .map(|action| match action {
                    ResponseAction::Say(say) => say.text.as_str(),
                })
                .collect::<Vec<&str>>()
                .join(" ")
        }

        pub fn into_twiml(self) -> String {
            super::wrap_twiml(xmlserde::xml_serialize(self))
        }
    }

    #[derive(PartialEq, Eq, Debug, XmlSerialize)]
    pub enum ResponseAction {
        #[xmlserde(name = b"Say")]
        Say(SayAction),
    }

    #[derive(PartialEq, Eq, Debug, XmlSerialize, Default)]
    pub struct SayAction {
        #[xmlserde(ty = "text")]
        pub text: String,
    }
}
pub use twiml::*;

mod voice {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq, Eq)]
    #[serde(rename_all = "kebab-case")]
    pub enum CallStatus {
        Queued,
        Ringing,
        InProgress,
        Completed,
        Busy,
        Failed,
        NoAnswer,
        Canceled,
        #[serde(other)]
        Unknown,
    }

    #[derive(Deserialize, Debug, PartialEq, Eq)]
    #[serde(rename_all = "kebab-case")]
    pub enum CallDirection {
        Inbound,
        OutboundApi,
        OutboundDial,
        TrunkingOriginating,
        TrunkingTerminating,
        #[serde(other)]
        Unknown,
    }

    /// Form fields Twilio posts to a voice webhook. Only `From` is required;
    /// the rest are kept for logging.
    #[allow(dead_code)]
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct TwilioVoicePayload {
        pub from: String,
        pub to: Option<String>,
        pub call_sid: Option<String>,
        pub account_sid: Option<String>,
        pub api_version: Option<String>,
        pub call_status: Option<CallStatus>,
        pub direction: Option<CallDirection>,
        pub from_city: Option<String>,
        pub from_state: Option<String>,
        pub from_country: Option<String>,
        pub from_zip: Option<String>,
    }
}
pub use voice::*;
