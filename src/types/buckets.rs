//! Closed bucket vocabularies
//!
//! Buckets stand in for raw counts and timestamps. Declaration order is the
//! total order: `Magnitude` is nothing < a_few < several, `HorizonKind` is
//! now < soon < today < later, `Source` is precedence order.

closed_enum! {
    /// Where a time-window candidate came from
    Source, field = "source" {
        Calendar => "calendar",
        InboxInstitution => "inbox_institution",
        InboxHuman => "inbox_human",
        DeviceHint => "device_hint",
    }
}

impl Source {
    /// Selection precedence (lower wins)
    pub fn precedence(&self) -> u8 {
        match self {
            Source::Calendar => 0,
            Source::InboxInstitution => 1,
            Source::InboxHuman => 2,
            Source::DeviceHint => 3,
        }
    }
}

closed_enum! {
    /// Circle a signal is attributed to
    CircleType, field = "circle_type" {
        Human => "human",
        Institution => "institution",
        SelfCircle => "self",
    }
}

closed_enum! {
    /// How soon a signal matters
    HorizonKind, field = "horizon_kind" {
        Now => "now",
        Soon => "soon",
        Today => "today",
        Later => "later",
    }
}

impl HorizonKind {
    /// One step earlier, floored at `now`
    pub fn shift_earlier(self) -> Self {
        match self {
            HorizonKind::Later => HorizonKind::Today,
            HorizonKind::Today => HorizonKind::Soon,
            HorizonKind::Soon | HorizonKind::Now => HorizonKind::Now,
        }
    }
}

closed_enum! {
    /// Abstract amount
    Magnitude, field = "magnitude" {
        Nothing => "nothing",
        AFew => "a_few",
        Several => "several",
    }
}

impl Magnitude {
    /// One bucket up, capped at `several`
    pub fn increment(self) -> Self {
        match self {
            Magnitude::Nothing => Magnitude::AFew,
            Magnitude::AFew | Magnitude::Several => Magnitude::Several,
        }
    }

    /// Bucket a raw count. The count itself never leaves this function.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Magnitude::Nothing,
            1..=3 => Magnitude::AFew,
            _ => Magnitude::Several,
        }
    }

    /// Calm display copy
    pub fn display_text(&self) -> &'static str {
        match self {
            Magnitude::Nothing => "nothing",
            Magnitude::AFew => "a few things",
            Magnitude::Several => "several things",
        }
    }
}

closed_enum! {
    /// Why a signal exists
    SignalReason, field = "reason" {
        MeetingUpcoming => "meeting_upcoming",
        InstitutionWaiting => "institution_waiting",
        HumanWaiting => "human_waiting",
        TransportHint => "transport_hint",
        HealthHint => "health_hint",
        InstitutionHint => "institution_hint",
    }
}

closed_enum! {
    /// What an evidence hash was derived from
    EvidenceKind, field = "evidence_kind" {
        CalendarEvent => "calendar_event",
        InboxThread => "inbox_thread",
        DeviceNotification => "device_notification",
    }
}

closed_enum! {
    /// How long an envelope or contract lasts
    DurationBucket, field = "duration_bucket" {
        Hour => "hour",
        Day => "day",
        Trip => "trip",
    }
}

impl DurationBucket {
    /// Offset from start to expiry
    pub fn offset(&self) -> chrono::Duration {
        let hours = match self {
            DurationBucket::Hour => crate::DURATION_HOUR_HOURS,
            DurationBucket::Day => crate::DURATION_DAY_HOURS,
            DurationBucket::Trip => crate::DURATION_TRIP_HOURS,
        };
        chrono::Duration::hours(hours)
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            DurationBucket::Hour => "for an hour",
            DurationBucket::Day => "for a day",
            DurationBucket::Trip => "for a trip",
        }
    }
}
