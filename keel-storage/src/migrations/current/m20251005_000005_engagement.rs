use sea_orm_migration::prelude::*;

use super::idens::*;
use crate::migration::{MigrationPlan, SchemaMigration};
use crate::schema::{columns, EntityTable};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl SchemaMigration for Migration {
    fn up(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        let backend = plan.backend();

        EntityTable::new(plan, Schedulers::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Schedulers::Name, 200))
            .column(columns::string(Schedulers::Slug, 100))
            .column(columns::string_null(Schedulers::Description, 500))
            .column(columns::int_default(Schedulers::DurationMinutes, 30))
            .column(columns::int_default(Schedulers::BufferMinutes, 0))
            .column(columns::string_default(Schedulers::TimeZone, 100, "UTC"))
            .column(columns::int_null(Schedulers::OwnerId))
            .foreign_key(Schedulers::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .column(columns::flag(Schedulers::IsActive, true))
            .audited()
            .soft_delete()
            .unique_index([Schedulers::TenantId, Schedulers::Slug])
            .create(plan);

        EntityTable::new(plan, SchedulerAvailabilities::Table)
            .tenant_scoped()
            .column(columns::int(SchedulerAvailabilities::SchedulerId))
            .foreign_key(
                SchedulerAvailabilities::SchedulerId,
                Schedulers::Table,
                ForeignKeyAction::Cascade,
            )
            .column(columns::int(SchedulerAvailabilities::DayOfWeek))
            .column(columns::time(SchedulerAvailabilities::StartTime))
            .column(columns::time(SchedulerAvailabilities::EndTime))
            .create(plan);

        // Reschedules form a chain; removing one booking unlinks its neighbours
        EntityTable::new(plan, SchedulerBookings::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::int(SchedulerBookings::SchedulerId))
            .foreign_key(SchedulerBookings::SchedulerId, Schedulers::Table, ForeignKeyAction::Cascade)
            .column(columns::int_null(SchedulerBookings::PersonId))
            .foreign_key(SchedulerBookings::PersonId, People::Table, ForeignKeyAction::SetNull)
            .column(columns::timestamp_required(SchedulerBookings::StartsAt))
            .column(columns::timestamp_required(SchedulerBookings::EndsAt))
            .column(columns::string_default(SchedulerBookings::Status, 20, "Confirmed"))
            .column(columns::string(SchedulerBookings::AttendeeName, 200))
            .column(columns::string(SchedulerBookings::AttendeeEmail, 256))
            .column(columns::text_null(SchedulerBookings::Notes))
            .column(columns::int_null(SchedulerBookings::RescheduledFromBookingId))
            .foreign_key(
                SchedulerBookings::RescheduledFromBookingId,
                SchedulerBookings::Table,
                ForeignKeyAction::SetNull,
            )
            .column(columns::int_null(SchedulerBookings::RescheduledToBookingId))
            .foreign_key(
                SchedulerBookings::RescheduledToBookingId,
                SchedulerBookings::Table,
                ForeignKeyAction::SetNull,
            )
            .column(columns::timestamp(SchedulerBookings::CancelledAt))
            .audited()
            .index([SchedulerBookings::SchedulerId, SchedulerBookings::StartsAt])
            .create(plan);

        EntityTable::new(plan, Sequences::Table)
            .public_id()
            .tenant_scoped()
            .column(columns::string(Sequences::Name, 200))
            .column(columns::string_null(Sequences::Description, 500))
            .column(columns::flag(Sequences::IsActive, true))
            .column(columns::int_null(Sequences::OwnerId))
            .foreign_key(Sequences::OwnerId, AspNetUsers::Table, ForeignKeyAction::SetNull)
            .audited()
            .soft_delete()
            .create(plan);

        EntityTable::new(plan, SequenceSteps::Table)
            .tenant_scoped()
            .column(columns::int(SequenceSteps::SequenceId))
            .foreign_key(SequenceSteps::SequenceId, Sequences::Table, ForeignKeyAction::Cascade)
            .column(columns::int(SequenceSteps::StepOrder))
            .column(columns::string(SequenceSteps::StepType, 50))
            .column(columns::int_default(SequenceSteps::DelayDays, 0))
            .column(columns::string_null(SequenceSteps::Subject, 200))
            .column(columns::text_null(SequenceSteps::Body))
            .audited()
            .unique_index([SequenceSteps::SequenceId, SequenceSteps::StepOrder])
            .create(plan);

        EntityTable::new(plan, SequenceEnrollments::Table)
            .tenant_scoped()
            .column(columns::int(SequenceEnrollments::SequenceId))
            .foreign_key(
                SequenceEnrollments::SequenceId,
                Sequences::Table,
                ForeignKeyAction::Cascade,
            )
            .column(columns::int(SequenceEnrollments::PersonId))
            .foreign_key(SequenceEnrollments::PersonId, People::Table, ForeignKeyAction::Cascade)
            .column(columns::int_default(SequenceEnrollments::CurrentStep, 0))
            .column(columns::string_default(SequenceEnrollments::Status, 20, "Active"))
            .column(columns::created_at(backend, SequenceEnrollments::EnrolledAt))
            .column(columns::timestamp(SequenceEnrollments::CompletedAt))
            .column(columns::timestamp(SequenceEnrollments::NextStepAt))
            .created()
            .create(plan);
        Ok(())
    }

    fn down(&self, plan: &mut MigrationPlan) -> Result<(), DbErr> {
        plan.drop_table(SequenceEnrollments::Table)
            .drop_table(SequenceSteps::Table)
            .drop_table(Sequences::Table)
            .drop_table(SchedulerBookings::Table)
            .drop_table(SchedulerAvailabilities::Table)
            .drop_table(Schedulers::Table);
        Ok(())
    }
}
