//! Identifiers of the current generation's tables

use crate::schema::table_idens;

table_idens! {
    AspNetUsers {
        UserName, NormalizedUserName, Email, NormalizedEmail, EmailConfirmed, PasswordHash,
        SecurityStamp, ConcurrencyStamp, PhoneNumber, PhoneNumberConfirmed, TwoFactorEnabled,
        LockoutEnd, LockoutEnabled, AccessFailedCount, FirstName, LastName, IsActive, LastLoginAt
    }
    AspNetRoles { Name, NormalizedName, ConcurrencyStamp, Description, IsSystemRole }
    AspNetUserRoles { UserId, RoleId }
    AspNetUserClaims { UserId, ClaimType, ClaimValue }
    AspNetRoleClaims { RoleId, ClaimType, ClaimValue }
    AspNetUserLogins { LoginProvider, ProviderKey, ProviderDisplayName, UserId }
    AspNetUserTokens { UserId, LoginProvider, Name, Value }

    SubscriptionPlans {
        Code, Name, Description, Price, Currency, BillingInterval, MaxUsers, MaxContacts,
        MaxDeals, MaxStorageMb, TrialDays, IsActive, SortOrder, Features
    }
    Tenants { Name, Slug, Domain, LogoUrl, TimeZone, Currency, Settings }
    TenantUsers { ApplicationUserId, IsOwner, JoinedAt, InvitedBy }
    Subscriptions {
        SubscriptionPlanId, Status, StartDate, EndDate, TrialEndsAt, CancelledAt,
        ExternalSubscriptionId
    }

    Organizations {
        Name, Website, Industry, Phone, Email, Address, City, Country, EmployeeCount,
        AnnualRevenue, OwnerId
    }
    People { OrganizationId, FirstName, LastName, Email, Phone, JobTitle, OwnerId }
    Pipelines { Name, Description, IsDefault, SortOrder }
    PipelineStages { PipelineId, Name, SortOrder, Probability, IsWon, IsLost }
    Leads {
        Title, FirstName, LastName, Email, Phone, CompanyName, Source, Status, Score, OwnerId,
        OrganizationId, PersonId
    }
    Deals {
        Title, Value, Currency, PipelineId, PipelineStageId, OrganizationId, PersonId, LeadId,
        OwnerId, ExpectedCloseDate, ClosedAt, Status
    }
    DealStageHistories { DealId, PreviousStageId, NextStageId, EnteredAt, ExitedAt, ChangedBy }
    Activities {
        Type, Subject, Description, DueAt, CompletedAt, IsCompleted, OwnerId, DealId, PersonId,
        OrganizationId, LeadId
    }

    ProductCategories { Name, Description, ParentCategoryId, SortOrder }
    Products { CategoryId, Name, Sku, Description, Price, Currency, IsActive }
    DealProducts { DealId, ProductId, Quantity, UnitPrice, Discount }

    Schedulers { Name, Slug, Description, DurationMinutes, BufferMinutes, TimeZone, OwnerId, IsActive }
    SchedulerAvailabilities { SchedulerId, DayOfWeek, StartTime, EndTime }
    SchedulerBookings {
        SchedulerId, PersonId, StartsAt, EndsAt, Status, AttendeeName, AttendeeEmail, Notes,
        RescheduledFromBookingId, RescheduledToBookingId, CancelledAt
    }
    Sequences { Name, Description, IsActive, OwnerId }
    SequenceSteps { SequenceId, StepOrder, StepType, DelayDays, Subject, Body }
    SequenceEnrollments { SequenceId, PersonId, CurrentStep, Status, EnrolledAt, CompletedAt, NextStepAt }

    Projects { Name, Description, Status, StartDate, DueDate, OwnerId, DealId, OrganizationId }
    ProjectTasks {
        ProjectId, ParentTaskId, Title, Description, Status, Priority, DueDate, CompletedAt,
        AssigneeId, SortOrder
    }

    Labels { Name, Color }
    EntityLabels { LabelId }
    EntityNotes { Content }
    EntityComments { ParentCommentId, Content }
    EntityDocuments { FileName, ContentType, SizeBytes, StoragePath }
    EntityImages { Url, AltText, IsPrimary, SortOrder }
    EntityPrices { Amount, Currency, ValidFrom, ValidTo }
    EntityParticipants { UserId, PersonId, Role }
}
