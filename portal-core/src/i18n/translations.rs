//! Built-in dictionaries. Both languages carry the same key set.

pub(crate) const EN: &[(&str, &str)] = &[
    ("appName", "Employee Portal"),
    ("languageEnglish", "English"),
    ("languageGerman", "German"),
    ("notificationsPanelTitle", "Notifications"),
    ("notificationsPanelWaiting", "{count} waiting"),
    ("notificationsAllCaughtUp", "All caught up"),
    ("notificationsMarkAllRead", "Mark all as read"),
    ("notificationsEmpty", "No notifications yet"),
    ("notificationsSectionToday", "Today"),
    ("notificationsSectionYesterday", "Yesterday"),
    ("notificationsSectionEarlier", "Earlier"),
    ("notificationsTableMissing", "Notifications are not available yet."),
    ("notificationJustNow", "Just now"),
    ("notificationComingSoon", "Coming soon"),
    ("notificationDefaultTitle", "Notification"),
    ("notificationDefaultDetail", "Open for details"),
    ("notificationCategoryShiftPublished", "Shift published"),
    ("notificationCategoryShiftRemoved", "Shift removed"),
    ("notificationCategoryScheduleChanged", "Schedule changed"),
    ("notificationCategoryAdminMessage", "Admin message"),
    ("notificationCategoryGeneral", "General"),
    ("notificationRecentShiftUpdate", "Recent shift update"),
    ("shiftsTitle", "My shifts"),
    ("shiftsEmpty", "No upcoming shifts"),
    ("shiftDefaultTitle", "Shift"),
    ("shiftLocationTbd", "TBD"),
    ("shiftPhaseUpcoming", "Upcoming"),
    ("shiftPhaseLive", "Live now"),
    ("shiftPhasePast", "Past shift"),
    ("shiftStatusScheduled", "Scheduled"),
    ("shiftStatusInProgress", "In progress"),
    ("shiftStatusCompleted", "Completed"),
    ("shiftStatusBlocked", "Blocked"),
    ("shiftConfirmationNotPublished", "Not published"),
    ("shiftConfirmationPending", "Pending"),
    ("shiftConfirmationScheduled", "Scheduled"),
    ("shiftConfirmationAssigned", "Assigned"),
    ("shiftConfirmationPublished", "Published"),
    ("shiftConfirmationConfirmed", "Confirmed"),
    ("shiftConfirmationConfirmedByEmployee", "Confirmed by employee"),
    ("shiftOpenInMaps", "Open in maps"),
    ("calendarSyncTitle", "Calendar sync"),
    ("calendarSelectedCount", "{count} calendars selected"),
    ("calendarNoneSelected", "No calendars selected"),
    ("securityResetLinkSent", "Password reset link sent to {email}."),
    ("sessionMissing", "You are not signed in."),
];

pub(crate) const DE: &[(&str, &str)] = &[
    ("appName", "Mitarbeiterportal"),
    ("languageEnglish", "Englisch"),
    ("languageGerman", "Deutsch"),
    ("notificationsPanelTitle", "Benachrichtigungen"),
    ("notificationsPanelWaiting", "{count} offen"),
    ("notificationsAllCaughtUp", "Alles erledigt"),
    ("notificationsMarkAllRead", "Alle als gelesen markieren"),
    ("notificationsEmpty", "Noch keine Benachrichtigungen"),
    ("notificationsSectionToday", "Heute"),
    ("notificationsSectionYesterday", "Gestern"),
    ("notificationsSectionEarlier", "Früher"),
    ("notificationsTableMissing", "Benachrichtigungen sind noch nicht verfügbar."),
    ("notificationJustNow", "Gerade eben"),
    ("notificationComingSoon", "Demnächst"),
    ("notificationDefaultTitle", "Benachrichtigung"),
    ("notificationDefaultDetail", "Für Details öffnen"),
    ("notificationCategoryShiftPublished", "Schicht veröffentlicht"),
    ("notificationCategoryShiftRemoved", "Schicht entfernt"),
    ("notificationCategoryScheduleChanged", "Plan geändert"),
    ("notificationCategoryAdminMessage", "Admin-Nachricht"),
    ("notificationCategoryGeneral", "Allgemein"),
    ("notificationRecentShiftUpdate", "Aktuelles Schicht-Update"),
    ("shiftsTitle", "Meine Schichten"),
    ("shiftsEmpty", "Keine anstehenden Schichten"),
    ("shiftDefaultTitle", "Schicht"),
    ("shiftLocationTbd", "Noch offen"),
    ("shiftPhaseUpcoming", "Bevorstehend"),
    ("shiftPhaseLive", "Läuft gerade"),
    ("shiftPhasePast", "Vergangene Schicht"),
    ("shiftStatusScheduled", "Geplant"),
    ("shiftStatusInProgress", "Läuft"),
    ("shiftStatusCompleted", "Abgeschlossen"),
    ("shiftStatusBlocked", "Blockiert"),
    ("shiftConfirmationNotPublished", "Nicht veröffentlicht"),
    ("shiftConfirmationPending", "Ausstehend"),
    ("shiftConfirmationScheduled", "Geplant"),
    ("shiftConfirmationAssigned", "Zugewiesen"),
    ("shiftConfirmationPublished", "Veröffentlicht"),
    ("shiftConfirmationConfirmed", "Bestätigt"),
    ("shiftConfirmationConfirmedByEmployee", "Vom Mitarbeiter bestätigt"),
    ("shiftOpenInMaps", "In Karten öffnen"),
    ("calendarSyncTitle", "Kalendersynchronisierung"),
    ("calendarSelectedCount", "{count} Kalender ausgewählt"),
    ("calendarNoneSelected", "Keine Kalender ausgewählt"),
    ("securityResetLinkSent", "Link zum Zurücksetzen des Passworts wurde an {email} gesendet."),
    ("sessionMissing", "Du bist nicht angemeldet."),
];
